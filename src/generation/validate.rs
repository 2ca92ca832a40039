//! Request validation with per-field error reporting

use url::Url;

use crate::error::{AppError, FieldError, Result};
use crate::generation::record::GenerationRequest;
use crate::upload;

/// Check a candidate request before it is allowed to create a record.
///
/// All constraint violations are collected so the caller can surface every
/// failing field at once instead of the first one hit. No side effects.
pub fn validate_request(request: &GenerationRequest) -> Result<()> {
    let mut errors = Vec::new();

    if request.prompt.trim().is_empty() {
        errors.push(FieldError::new("prompt", "Prompt is required"));
    }

    if request.image_urls.is_empty() {
        errors.push(FieldError::new("imageUrls", "At least one image is required"));
    } else {
        for (index, candidate) in request.image_urls.iter().enumerate() {
            if Url::parse(candidate).is_err() {
                errors.push(FieldError::new(
                    format!("imageUrls[{index}]"),
                    format!("'{candidate}' is not a well-formed URL"),
                ));
            } else if upload::is_data_url(candidate) && upload::decode_data_url(candidate).is_err()
            {
                // Embedded references must round-trip back to bytes
                errors.push(FieldError::new(
                    format!("imageUrls[{index}]"),
                    "Data URL payload is not valid base64".to_string(),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
