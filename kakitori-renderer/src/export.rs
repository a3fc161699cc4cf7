//! PNG export of surface rasters.
//!
//! Used by the CLI to write rendered stroke logs to disk and by hosts that
//! want a `data:` URI for an `<img>` preview or a recognizer that only takes
//! encoded images.

use std::io::Cursor;

use base64::Engine;
use image::ImageEncoder;
use kakitori_core::Raster;

use crate::error::{RenderError, RenderResult};

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encode a raster as PNG.
///
/// # Errors
///
/// Returns an error if the encoder rejects the pixel buffer.
pub fn encode_png(raster: &Raster) -> RenderResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            raster.as_rgba(),
            raster.width(),
            raster.height(),
            image::ColorType::Rgba8.into(),
        )
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Decode PNG bytes back into a raster.
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable PNG.
pub fn decode_png(bytes: &[u8]) -> RenderResult<Raster> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| RenderError::Export(format!("PNG decoding failed: {e}")))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Raster::from_rgba(width, height, img.into_raw())
        .ok_or_else(|| RenderError::Export("Decoded buffer has the wrong size".to_string()))
}

/// Encode a raster as a `data:image/png;base64,...` URI.
///
/// # Errors
///
/// Returns an error if PNG encoding fails.
pub fn to_data_uri(raster: &Raster) -> RenderResult<String> {
    let png = encode_png(raster)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Ok(format!("{DATA_URI_PREFIX}{encoded}"))
}

/// Decode a PNG `data:` URI produced by [`to_data_uri`].
///
/// # Errors
///
/// Returns an error if the URI is not a base64 PNG data URI or the payload
/// cannot be decoded.
pub fn from_data_uri(uri: &str) -> RenderResult<Raster> {
    let encoded = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| RenderError::Export("Not a base64 PNG data URI".to_string()))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| RenderError::Export(format!("Failed to decode base64: {e}")))?;
    decode_png(&bytes)
}
