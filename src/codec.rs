//! Image transport encoding
//!
//! Images travel as base64 text. Input may be any format the `image` crate
//! decodes, optionally wrapped in a `data:` URL; output is always PNG so the
//! alpha channel survives.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

/// Encoding errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Drop a `data:<mime>;base64,` prefix if present
fn strip_data_url(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with("data:") {
        if let Some((_, payload)) = text.split_once(',') {
            return payload;
        }
    }
    text
}

/// Decode base64 image bytes into an RGBA buffer
pub fn decode_image(text: &str) -> Result<RgbaImage> {
    let bytes = STANDARD.decode(strip_data_url(text))?;
    let image = image::load_from_memory(&bytes).map_err(CodecError::Decode)?;
    Ok(image.to_rgba8())
}

/// PNG bytes of `image`
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(CodecError::Encode)?;
    Ok(buffer.into_inner())
}

/// Base64 PNG of `image`; a zero-area image encodes as an empty string
pub fn encode_image(image: &RgbaImage) -> Result<String> {
    if image.width() == 0 || image.height() == 0 {
        return Ok(String::new());
    }
    Ok(STANDARD.encode(encode_png(image)?))
}
