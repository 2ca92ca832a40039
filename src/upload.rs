//! Data-URL encoding for uploaded reference images
//!
//! Uploaded bytes are embedded directly as `data:` URLs so the store never
//! has to manage files; the references round-trip through the record's
//! `imageUrls` like any remote URL.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{AppError, Result};

/// Embed raw bytes as a data URL under the given content type
pub fn to_data_url(content_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(data))
}

pub fn is_data_url(candidate: &str) -> bool {
    candidate.starts_with("data:")
}

/// Content type of a data URL, if it carries one
pub fn content_type_of(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:")?;
    let end = rest.find(';')?;
    Some(&rest[..end])
}

/// Decode the payload of a data URL back to raw bytes
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let payload = data_url
        .split(',')
        .nth(1)
        .ok_or_else(|| AppError::InvalidRequest("Malformed data URL".to_string()))?;

    STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::InvalidRequest(format!("Invalid base64 payload: {}", e)))
}
