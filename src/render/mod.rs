//! Rendering layer: three figure builders over one shared heat-grid painter.
//!
//! ```text
//!   Table ──► heatmap ─────┐
//!         ──► clustermap ──┼──► HeatGrid ──► Figure (RGB buffer) ──► persist
//!         ──► correlation ─┘
//! ```
//!
//! Every renderer first reduces its input to a [`HeatGrid`] (ordered labels,
//! values and an optional mask), then paints it with plotters onto an
//! in-memory bitmap sized in inches at [`DPI`].
pub mod clustermap;
pub mod correlation;
pub mod heatmap;
pub mod persist;

use image::RgbImage;
use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use thiserror::Error;

use crate::color::{text_color_for, to_rgb, ColorScale};
use crate::config::DPI;

pub use clustermap::render_clustermap;
pub use correlation::render_correlation;
pub use heatmap::render_heatmap;
pub use persist::save_figure;

const FONT: &str = "sans-serif";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Draw(String),

    #[error(transparent)]
    Cluster(#[from] crate::cluster::ClusterError),

    #[error("nothing to draw: {0}")]
    NoData(&'static str),

    #[error("pixel buffer of {0}x{1} does not match the figure size")]
    Buffer(u32, u32),

    #[error("cannot allocate a {0}x{1} px canvas")]
    Alloc(u32, u32),

    #[error("cannot write {}: {source}", path.display())]
    Save {
        path: std::path::PathBuf,
        #[source]
        source: png::EncodingError,
    },
}

fn draw_err<E: std::error::Error>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}

type Result<T> = core::result::Result<T, RenderError>;

/// Drawing surface handed to the figure builders.
pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Inches → pixels at [`DPI`].
pub fn px(inches: f64) -> u32 {
    (inches * DPI as f64).round().max(0.0) as u32
}

/// Points → pixels at [`DPI`].
pub fn pt(points: f64) -> u32 {
    px(points / 72.0)
}

/// Rough pixel extent of the longest label set in a `font_px` sans font.
pub fn label_extent<S: AsRef<str>>(labels: &[S], font_px: u32) -> u32 {
    let longest = labels
        .iter()
        .map(|l| l.as_ref().chars().count())
        .max()
        .unwrap_or(0);
    (longest as f64 * font_px as f64 * 0.62).ceil() as u32
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// A rendered raster, kept only until it is saved.
#[derive(Debug, Clone)]
pub struct Figure {
    pub dpi: u32,
    pub image: RgbImage,
}

impl Figure {
    /// Allocate a white `width x height` pixel canvas and let `paint` draw on it.
    pub fn draw<F>(width: u32, height: u32, paint: F) -> Result<Figure>
    where
        F: FnOnce(&Canvas<'_>) -> Result<()>,
    {
        log::debug!(
            "rasterising {width}x{height} px ({:.1}x{:.1} in)",
            width as f64 / DPI as f64,
            height as f64 / DPI as f64
        );
        let len = width as usize * height as usize * 3;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| RenderError::Alloc(width, height))?;
        buffer.resize(len, 0u8);
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            paint(&root)?;
            root.present().map_err(draw_err)?;
        }
        let image =
            RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer(width, height))?;
        Ok(Figure { dpi: DPI, image })
    }

    pub fn width_inches(&self) -> f64 {
        self.image.width() as f64 / self.dpi as f64
    }

    pub fn height_inches(&self) -> f64 {
        self.image.height() as f64 / self.dpi as f64
    }
}

// ---------------------------------------------------------------------------
// HeatGrid – what a heatmap shows, independent of pixels
// ---------------------------------------------------------------------------

/// Labelled values in display order, plus cells hidden from view.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatGrid {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub values: Array2<f64>,
    /// `true` marks a cell that is not drawn.
    pub mask: Option<Array2<bool>>,
}

impl HeatGrid {
    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    /// A cell is drawn unless masked or non-finite.
    pub fn is_visible(&self, row: usize, col: usize) -> bool {
        let masked = self.mask.as_ref().map_or(false, |m| m[[row, col]]);
        !masked && self.values[[row, col]].is_finite()
    }

    /// Coordinates of every drawn cell, row-major.
    pub fn visible_cells(&self) -> Vec<(usize, usize)> {
        let (rows, cols) = self.values.dim();
        (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .filter(|&(r, c)| self.is_visible(r, c))
            .collect()
    }

    /// Colour scale over the drawn cells.
    pub fn color_scale(&self) -> Option<ColorScale> {
        ColorScale::spanning(
            self.visible_cells()
                .into_iter()
                .map(|(r, c)| self.values[[r, c]]),
        )
    }
}

/// Pixel geometry and styling for painting a [`HeatGrid`].
#[derive(Debug, Clone, Copy)]
pub struct GridStyle {
    pub origin: (i32, i32),
    pub cell_w: u32,
    pub cell_h: u32,
    pub line_px: u32,
    pub line_color: RGBColor,
    /// Annotation font size; `None` leaves cells unlabelled.
    pub annot_px: Option<u32>,
}

impl GridStyle {
    pub fn cell_rect(&self, row: usize, col: usize) -> [(i32, i32); 2] {
        let x0 = self.origin.0 + (col as u32 * self.cell_w) as i32;
        let y0 = self.origin.1 + (row as u32 * self.cell_h) as i32;
        [(x0, y0), (x0 + self.cell_w as i32, y0 + self.cell_h as i32)]
    }

    pub fn width(&self, grid: &HeatGrid) -> u32 {
        grid.n_cols() as u32 * self.cell_w
    }

    pub fn height(&self, grid: &HeatGrid) -> u32 {
        grid.n_rows() as u32 * self.cell_h
    }
}

/// Paint visible cells, their separating lines, and optional annotations.
pub fn draw_cells(
    area: &Canvas<'_>,
    grid: &HeatGrid,
    style: &GridStyle,
    scale: &ColorScale,
) -> Result<()> {
    for (row, col) in grid.visible_cells() {
        let value = grid.values[[row, col]];
        let fill = scale.color_for(value);
        let rect = style.cell_rect(row, col);

        area.draw(&Rectangle::new(rect, to_rgb(fill).filled()))
            .map_err(draw_err)?;
        if style.line_px > 0 {
            area.draw(&Rectangle::new(
                rect,
                style.line_color.stroke_width(style.line_px),
            ))
            .map_err(draw_err)?;
        }

        if let Some(size) = style.annot_px {
            let center = (
                (rect[0].0 + rect[1].0) / 2,
                (rect[0].1 + rect[1].1) / 2,
            );
            let text_style = (FONT, size as f64)
                .into_font()
                .color(&text_color_for(fill))
                .pos(Pos::new(HPos::Center, VPos::Center));
            area.draw(&Text::new(format_annotation(value), center, text_style))
                .map_err(draw_err)?;
        }
    }
    Ok(())
}

/// Every how many-th label to draw so that `font_px` text fits a `pitch_px` spacing.
pub fn label_step(pitch_px: u32, font_px: u32) -> usize {
    (font_px as f64 / pitch_px.max(1) as f64).ceil().max(1.0) as usize
}

/// Horizontal labels, one per grid row where they fit, anchored at `x`.
///
/// `HPos::Right` places them to the left of `x`, `HPos::Left` to its right.
pub fn draw_row_labels(
    area: &Canvas<'_>,
    labels: &[String],
    x: i32,
    style: &GridStyle,
    font_px: u32,
    side: HPos,
) -> Result<()> {
    let text_style = (FONT, font_px as f64)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(side, VPos::Center));
    let step = label_step(style.cell_h, font_px);
    for (row, label) in labels.iter().enumerate().step_by(step) {
        let y = style.origin.1 + (row as u32 * style.cell_h + style.cell_h / 2) as i32;
        area.draw(&Text::new(label.clone(), (x, y), text_style.clone()))
            .map_err(draw_err)?;
    }
    Ok(())
}

/// Vertical labels, one per grid column where they fit, reading upward and
/// ending at `y`. plotters rotates text in quarter turns only, so they stand at
/// 90° rather than a slant.
pub fn draw_col_labels(
    area: &Canvas<'_>,
    labels: &[String],
    y: i32,
    style: &GridStyle,
    font_px: u32,
) -> Result<()> {
    let text_style = (FONT, font_px as f64)
        .into_font()
        .transform(FontTransform::Rotate270)
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    let step = label_step(style.cell_w, font_px);
    for (col, label) in labels.iter().enumerate().step_by(step) {
        let x = style.origin.0 + (col as u32 * style.cell_w + style.cell_w / 2) as i32;
        area.draw(&Text::new(label.clone(), (x, y), text_style.clone()))
            .map_err(draw_err)?;
    }
    Ok(())
}

/// Number of ticks on every colour bar.
pub const COLORBAR_TICKS: usize = 5;

/// Tick labels for a colour bar over `scale`.
pub fn colorbar_labels(scale: &ColorScale) -> Vec<String> {
    scale
        .ticks(COLORBAR_TICKS)
        .into_iter()
        .map(format_annotation)
        .collect()
}

/// Vertical colour bar in `rect` (top-left, bottom-right), high values on top,
/// with tick labels to its right.
pub fn draw_colorbar(
    area: &Canvas<'_>,
    scale: &ColorScale,
    rect: [(i32, i32); 2],
    font_px: u32,
) -> Result<()> {
    let [(x0, y0), (x1, y1)] = rect;
    let height = (y1 - y0).max(1);

    for dy in 0..height {
        let t = 1.0 - dy as f64 / (height - 1).max(1) as f64;
        let value = scale.vmin + t * (scale.vmax - scale.vmin);
        let color = to_rgb(scale.color_for(value));
        area.draw(&Rectangle::new(
            [(x0, y0 + dy), (x1, y0 + dy + 1)],
            color.filled(),
        ))
        .map_err(draw_err)?;
    }
    area.draw(&Rectangle::new(rect, BLACK.stroke_width(1)))
        .map_err(draw_err)?;

    let tick_len = (x1 - x0).max(4) / 4;
    let text_style = (FONT, font_px as f64)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for (value, label) in scale.ticks(COLORBAR_TICKS).into_iter().zip(colorbar_labels(scale)) {
        let y = y1 - (scale.normalize(value) * height as f64).round() as i32;
        area.draw(&PathElement::new(
            vec![(x1, y), (x1 + tick_len, y)],
            BLACK.stroke_width(2),
        ))
        .map_err(draw_err)?;
        area.draw(&Text::new(
            label,
            (x1 + tick_len * 2, y),
            text_style.clone(),
        ))
        .map_err(draw_err)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Annotation text
// ---------------------------------------------------------------------------

/// Two significant digits in general notation, e.g. `0.12`, `12`, `1.2e+02`.
pub fn format_annotation(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    // `{:.1e}` rounds to two significant digits and yields the exponent.
    let sci = format!("{value:.1e}");
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if !(-4..2).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs());
    }
    let decimals = (1 - exp).max(0) as usize;
    trim_zeros(&format!("{value:.decimals$}")).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn grid(mask: Option<Array2<bool>>) -> HeatGrid {
        HeatGrid {
            row_labels: vec!["a".into(), "b".into()],
            col_labels: vec!["x".into(), "y".into()],
            values: array![[1.0, f64::NAN], [3.0, 4.0]],
            mask,
        }
    }

    #[test]
    fn formats_two_significant_digits() {
        assert_eq!(format_annotation(0.0), "0");
        assert_eq!(format_annotation(1.0), "1");
        assert_eq!(format_annotation(0.5), "0.5");
        assert_eq!(format_annotation(0.123), "0.12");
        assert_eq!(format_annotation(-0.333), "-0.33");
        assert_eq!(format_annotation(12.3), "12");
        assert_eq!(format_annotation(9.96), "10");
        assert_eq!(format_annotation(123.0), "1.2e+02");
        assert_eq!(format_annotation(100.0), "1e+02");
        assert_eq!(format_annotation(0.00012), "0.00012");
        assert_eq!(format_annotation(0.000012), "1.2e-05");
    }

    #[test]
    fn non_finite_and_masked_cells_are_hidden() {
        let unmasked = grid(None);
        assert_eq!(unmasked.visible_cells(), vec![(0, 0), (1, 0), (1, 1)]);

        let masked = grid(Some(array![[false, false], [false, true]]));
        assert_eq!(masked.visible_cells(), vec![(0, 0), (1, 0)]);
        assert_eq!(
            masked.color_scale(),
            Some(ColorScale { vmin: 1.0, vmax: 3.0 })
        );
    }

    #[test]
    fn cell_rects_tile_the_grid() {
        let style = GridStyle {
            origin: (10, 20),
            cell_w: 5,
            cell_h: 7,
            line_px: 1,
            line_color: BLACK,
            annot_px: None,
        };
        assert_eq!(style.cell_rect(0, 0), [(10, 20), (15, 27)]);
        assert_eq!(style.cell_rect(1, 2), [(20, 27), (25, 34)]);
        let g = grid(None);
        assert_eq!((style.width(&g), style.height(&g)), (10, 14));
    }

    #[test]
    fn labels_thin_out_on_small_cells() {
        assert_eq!(label_step(150, 42), 1);
        assert_eq!(label_step(42, 42), 1);
        assert_eq!(label_step(6, 42), 7);
        assert_eq!(label_step(0, 42), 42);
    }

    #[test]
    fn figure_is_white_at_requested_size() {
        let figure = Figure::draw(40, 20, |_| Ok(())).unwrap();
        assert_eq!(figure.image.dimensions(), (40, 20));
        assert_eq!(figure.dpi, DPI);
        assert!(figure.image.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn units_follow_dpi() {
        assert_eq!(px(1.0), DPI);
        assert_eq!(pt(72.0), DPI);
        assert_eq!(label_extent::<&str>(&[], 10), 0);
        assert!(label_extent(&["abcd", "ab"], 10) > label_extent(&["ab"], 10));
    }
}
