use std::fmt;

use palette::{LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

use crate::config::COLOR_MAP;

// ---------------------------------------------------------------------------
// YlGnBu sequential colour map
// ---------------------------------------------------------------------------

/// ColorBrewer nine-class YlGnBu, light (low) to dark (high).
const YLGNBU: [Srgb<u8>; 9] = [
    Srgb::new(0xff, 0xff, 0xd9),
    Srgb::new(0xed, 0xf8, 0xb1),
    Srgb::new(0xc7, 0xe9, 0xb4),
    Srgb::new(0x7f, 0xcd, 0xbb),
    Srgb::new(0x41, 0xb6, 0xc4),
    Srgb::new(0x1d, 0x91, 0xc0),
    Srgb::new(0x22, 0x5e, 0xa8),
    Srgb::new(0x25, 0x34, 0x94),
    Srgb::new(0x08, 0x1d, 0x58),
];

/// Dark grey used for annotations on light cells.
pub const DARK_TEXT: RGBColor = RGBColor(38, 38, 38);
pub const LIGHT_TEXT: RGBColor = RGBColor(255, 255, 255);

/// Luminance above which a cell counts as light.
const LIGHT_CELL_LUMINANCE: f32 = 0.408;

/// A sequential colour map, sampled on `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    YlGnBu,
}

impl ColorMap {
    fn anchors(self) -> &'static [Srgb<u8>] {
        match self {
            ColorMap::YlGnBu => &YLGNBU,
        }
    }

    /// Sample at `t ∈ [0, 1]` (clamped, NaN reads as 0), interpolating in sRGB.
    pub fn sample(self, t: f64) -> Srgb {
        let anchors = self.anchors();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (anchors.len() - 1) as f64;
        let lo = (pos.floor() as usize).min(anchors.len() - 2);
        let frac = (pos - lo as f64) as f32;

        let a: Srgb = anchors[lo].into_format();
        let b: Srgb = anchors[lo + 1].into_format();
        a.mix(b, frac)
    }
}

impl fmt::Display for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMap::YlGnBu => write!(f, "YlGnBu"),
        }
    }
}

pub fn to_rgb(color: Srgb) -> RGBColor {
    let c: Srgb<u8> = color.into_format();
    RGBColor(c.red, c.green, c.blue)
}

/// WCAG relative luminance of an sRGB colour.
pub fn relative_luminance(color: Srgb) -> f32 {
    let lin: LinSrgb = color.into_linear();
    0.2126 * lin.red + 0.7152 * lin.green + 0.0722 * lin.blue
}

/// Annotation colour readable on top of `background`.
pub fn text_color_for(background: Srgb) -> RGBColor {
    if relative_luminance(background) > LIGHT_CELL_LUMINANCE {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}

// ---------------------------------------------------------------------------
// Value → colour mapping
// ---------------------------------------------------------------------------

/// Linear normalisation of `[vmin, vmax]` onto the colour map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorScale {
    /// Scale spanning the finite values of `values`; `None` if there are none.
    pub fn spanning<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let (vmin, vmax) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        (vmin <= vmax).then_some(ColorScale { vmin, vmax })
    }

    /// Position of `value` on the scale; a degenerate range maps to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.vmax - self.vmin;
        if range.abs() < f64::EPSILON {
            0.0
        } else {
            ((value - self.vmin) / range).clamp(0.0, 1.0)
        }
    }

    pub fn color_for(&self, value: f64) -> Srgb {
        COLOR_MAP.sample(self.normalize(value))
    }

    /// `count` evenly spaced tick values from `vmin` to `vmax`.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        if count < 2 || self.vmax == self.vmin {
            return vec![self.vmin];
        }
        let step = (self.vmax - self.vmin) / (count - 1) as f64;
        (0..count).map(|i| self.vmin + step * i as f64).collect()
    }
}
