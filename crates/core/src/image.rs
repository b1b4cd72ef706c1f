//! Decoding of recipe images sent inline as base64 data URIs.
//!
//! Clients send `data:image/png;base64,iVBORw0...`. The MIME subtype becomes
//! the file extension used by the image store.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const DATA_URI_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";
const MAX_EXTENSION_LENGTH: usize = 10;

/// Errors produced while decoding an inline image.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The value does not start with `data:image/`.
    #[error("invalid image: expected a data:image/...;base64 URI")]
    NotDataUri,
    /// The `;base64,` marker is missing.
    #[error("invalid image: payload must be base64 encoded")]
    MissingBase64Marker,
    /// The MIME subtype can't be used as a file extension.
    #[error("invalid image: unsupported type {0:?}")]
    InvalidExtension(String),
    /// The payload is not valid base64.
    #[error("invalid image: {0}")]
    InvalidBase64(String),
    /// The payload decoded to zero bytes.
    #[error("invalid image: empty payload")]
    Empty,
}

/// Binary image content plus the extension derived from its MIME subtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// Lower-cased extension without a dot, e.g. `png`.
    pub extension: String,
}

/// Decode a `data:image/<subtype>;base64,<payload>` string.
///
/// # Errors
///
/// Returns [`ImageError`] if the prefix, subtype or payload is malformed.
///
/// # Example
///
/// ```
/// use foodgram_core::image::decode_data_uri;
///
/// let image = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
/// assert_eq!(image.extension, "png");
/// assert_eq!(image.bytes, b"hello");
/// ```
pub fn decode_data_uri(value: &str) -> Result<DecodedImage, ImageError> {
    let rest = value
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or(ImageError::NotDataUri)?;

    let (subtype, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or(ImageError::MissingBase64Marker)?;

    let extension = subtype.to_ascii_lowercase();
    if extension.is_empty()
        || extension.len() > MAX_EXTENSION_LENGTH
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ImageError::InvalidExtension(subtype.to_owned()));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;

    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    Ok(DecodedImage { bytes, extension })
}
