//! Decoding of base64 `data:` URI image uploads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use foodgram_core::error::DomainError;

/// An uploaded image whose bytes were verified to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    /// File extension derived from the sniffed format, e.g. `png`.
    pub extension: &'static str,
}

/// Decodes a `data:image/<ext>;base64,<payload>` URI.
///
/// The declared media type is only checked for the `image/` prefix; the
/// stored extension comes from the sniffed content.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the URI is malformed, the payload is
/// not base64, or the bytes are not a decodable image.
pub fn decode_data_uri(uri: &str) -> Result<ImageUpload, DomainError> {
    let rest = uri
        .strip_prefix("data:image/")
        .ok_or_else(|| DomainError::validation("image: expected a data:image/... URI"))?;
    let (_declared, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| DomainError::validation("image: expected base64-encoded data"))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DomainError::validation(format!("image: invalid base64 payload: {e}")))?;

    let format = image::guess_format(&bytes)
        .map_err(|_| DomainError::validation("image: unrecognised image format"))?;
    image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| DomainError::validation(format!("image: corrupt image: {e}")))?;

    let extension = format.extensions_str().first().copied().unwrap_or("img");
    Ok(ImageUpload { bytes, extension })
}
