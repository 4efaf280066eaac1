use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{imageops, Rgb, RgbImage};
use png::{BitDepth, ColorType, Encoder, EncodingError, PixelDimensions, Unit};

use super::{px, Figure, RenderError, Result};
use crate::config::TRIM_PAD_INCHES;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Bounding box `(x, y, width, height)` of every non-background pixel.
pub fn content_bounds(image: &RgbImage) -> Option<(u32, u32, u32, u32)> {
    let (mut x0, mut y0) = (u32::MAX, u32::MAX);
    let (mut x1, mut y1) = (0u32, 0u32);
    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel != BACKGROUND {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }
    (x0 <= x1 && y0 <= y1).then(|| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

/// Crop to the content plus `pad` pixels on each side; blank images are kept whole.
pub fn trim(image: &RgbImage, pad: u32) -> RgbImage {
    let Some((x, y, w, h)) = content_bounds(image) else {
        return image.clone();
    };
    let left = x.saturating_sub(pad);
    let top = y.saturating_sub(pad);
    let right = (x + w + pad).min(image.width());
    let bottom = (y + h + pad).min(image.height());
    imageops::crop_imm(image, left, top, right - left, bottom - top).to_image()
}

/// Pixels per metre for a resolution in dots per inch, as PNG `pHYs` stores it.
pub fn pixels_per_metre(dpi: u32) -> u32 {
    (dpi as f64 / 0.0254).round() as u32
}

fn write_png(image: &RgbImage, dpi: u32, path: &Path) -> core::result::Result<(), EncodingError> {
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = Encoder::new(file, image.width(), image.height());
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);
    let ppm = pixels_per_metre(dpi);
    encoder.set_pixel_dims(Some(PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: Unit::Meter,
    }));

    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()
}

/// Trim the figure to its content and write it as PNG tagged with its DPI.
///
/// No temporary file or retry: a failed write leaves whatever reached disk.
pub fn save_figure(figure: Figure, path: &Path) -> Result<u64> {
    let dpi = figure.dpi;
    let trimmed = trim(&figure.image, px(TRIM_PAD_INCHES));
    drop(figure);

    write_png(&trimmed, dpi, path).map_err(|source| RenderError::Save {
        path: path.to_path_buf(),
        source,
    })?;

    let bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    log::info!(
        "wrote {} ({}x{} px at {dpi} dpi, {bytes} bytes)",
        path.display(),
        trimmed.width(),
        trimmed.height()
    );
    Ok(bytes)
}
