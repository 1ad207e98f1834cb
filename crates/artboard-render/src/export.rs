//! PNG export of the canvas area.
//!
//! The shell captures a frame drawn without overlays; this module crops the
//! canvas out of it, resamples to the export pixel ratio and encodes a PNG.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use kurbo::{Rect, Size};
use thiserror::Error;

/// Output pixels per canvas unit.
pub const EXPORT_PIXEL_RATIO: f64 = 2.0;
/// Suggested file name in the save dialog.
pub const EXPORT_FILE_NAME: &str = "design.png";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Captured frame is malformed: {0}")]
    InvalidCapture(String),
    #[error("Canvas is outside the captured frame")]
    OutOfFrame,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The on-screen part of the canvas to crop from a capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRegion {
    /// Logical screen rect to crop.
    pub screen_rect: Rect,
    /// Canvas units covered by `screen_rect`.
    pub canvas_size: Size,
    /// Part of the canvas lay outside the visible area and is missing.
    pub partial: bool,
}

/// Clip the canvas to the visible canvas area.
///
/// The side panels cover the canvas on narrow windows, so only the part
/// inside `visible` is exported. Returns `None` when nothing is visible.
pub fn export_region(canvas_screen_rect: Rect, visible: Rect, zoom: f64) -> Option<ExportRegion> {
    let clipped = canvas_screen_rect.intersect(visible);
    if clipped.width() <= 0.0 || clipped.height() <= 0.0 {
        return None;
    }
    let partial = clipped.width() < canvas_screen_rect.width() - 1e-6
        || clipped.height() < canvas_screen_rect.height() - 1e-6;
    Some(ExportRegion {
        screen_rect: clipped,
        canvas_size: Size::new(clipped.width() / zoom, clipped.height() / zoom),
        partial,
    })
}

/// A captured frame in physical pixels.
pub struct Capture<'a> {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8.
    pub rgba: &'a [u8],
    /// Physical pixels per logical screen point.
    pub pixels_per_point: f64,
}

/// Crop the canvas out of `capture` and encode it as PNG.
///
/// `canvas_screen_rect` is in logical points; the output is
/// `canvas_size × EXPORT_PIXEL_RATIO` pixels regardless of zoom.
pub fn export_canvas(
    capture: &Capture<'_>,
    canvas_screen_rect: Rect,
    canvas_size: Size,
) -> Result<Vec<u8>, ExportError> {
    let frame = RgbaImage::from_raw(capture.width, capture.height, capture.rgba.to_vec())
        .ok_or_else(|| {
            ExportError::InvalidCapture(format!(
                "{} bytes for {}x{}",
                capture.rgba.len(),
                capture.width,
                capture.height
            ))
        })?;

    let ppp = capture.pixels_per_point;
    let x0 = (canvas_screen_rect.x0 * ppp).round().max(0.0);
    let y0 = (canvas_screen_rect.y0 * ppp).round().max(0.0);
    let x1 = (canvas_screen_rect.x1 * ppp).round().min(capture.width as f64);
    let y1 = (canvas_screen_rect.y1 * ppp).round().min(capture.height as f64);
    if x1 <= x0 || y1 <= y0 {
        return Err(ExportError::OutOfFrame);
    }

    let cropped = imageops::crop_imm(
        &frame,
        x0 as u32,
        y0 as u32,
        (x1 - x0) as u32,
        (y1 - y0) as u32,
    )
    .to_image();

    let out_width = ((canvas_size.width * EXPORT_PIXEL_RATIO).round() as u32).max(1);
    let out_height = ((canvas_size.height * EXPORT_PIXEL_RATIO).round() as u32).max(1);
    let resized = if cropped.dimensions() == (out_width, out_height) {
        cropped
    } else {
        imageops::resize(&cropped, out_width, out_height, FilterType::Triangle)
    };

    log::debug!("Exporting canvas at {out_width}x{out_height}");
    encode_png(resized.as_raw(), out_width, out_height)
}

/// Encode RGBA8 pixels as a PNG.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
    }
    Ok(png_data)
}
