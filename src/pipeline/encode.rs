//! Image encoding: `DynamicImage` → base64 PNG strings.
//!
//! Extracted images travel inside the JSON response body, so each one is
//! serialised to PNG in memory and base64-encoded with the standard
//! alphabet. PNG is chosen over JPEG because it is lossless — the bytes a
//! caller decodes are exactly what the engine produced.

use crate::error::ConvertError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use std::collections::BTreeMap;
use std::io::Cursor;
use tracing::debug;

/// Encode one image as a base64 PNG string.
pub fn encode_png_base64(img: &DynamicImage) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!("encoded image → {} bytes base64", b64.len());

    Ok(b64)
}

/// Encode the engine's whole image map for transport.
///
/// Any single undecodable image fails the request; partial image sets
/// would silently misrepresent the document.
pub fn encode_images(
    images: &BTreeMap<String, DynamicImage>,
) -> Result<BTreeMap<String, String>, ConvertError> {
    images
        .iter()
        .map(|(id, img)| {
            encode_png_base64(img)
                .map(|b64| (id.clone(), b64))
                .map_err(|e| ConvertError::ImageEncode {
                    id: id.clone(),
                    detail: e.to_string(),
                })
        })
        .collect()
}
