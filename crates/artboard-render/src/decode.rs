//! Bitmap decoding for image elements.

use artboard_core::images::{Bitmap, LoadError};

/// Decode PNG, JPEG or WebP bytes into an RGBA8 bitmap.
pub fn decode_bitmap(bytes: &[u8]) -> Result<Bitmap, LoadError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Decoded {width}x{height} bitmap from {} bytes", bytes.len());
    Bitmap::new(width, height, rgba.into_raw())
}
