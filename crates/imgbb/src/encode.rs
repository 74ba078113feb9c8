//! PNG normalisation and base64 payload encoding.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;

/// Return `bytes` as PNG, re-encoding any other supported format.
pub fn to_png(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    if image::guess_format(bytes).ok() == Some(ImageFormat::Png) {
        return Ok(bytes.to_vec());
    }

    let decoded = image::load_from_memory(bytes)?;
    let mut out = Cursor::new(Vec::new());
    decoded.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Standard base64 of `bytes`, as the upload form field expects.
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}
