//! External generation capability: trait, output shapes, HTTP implementation

pub mod http;

pub use http::HttpProvider;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// The shapes the external model is known to return its result in.
///
/// Deserialized untagged, so whichever JSON shape arrives is captured; the
/// normalization into a single URL string happens in `into_result_url` with
/// a fixed priority order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProviderOutput {
    /// A bare URL string
    Url(String),
    /// A list of URL strings; the first one wins
    Many(Vec<String>),
    /// An object exposing a resolvable location
    Object(OutputObject),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputObject {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ProviderOutput {
    /// Normalize to a single result URL.
    ///
    /// Priority order: bare string, first array element, `href` key, `url`
    /// key. Anything else is an unrecognized shape, reported deterministically
    /// rather than guessed at.
    pub fn into_result_url(self) -> Result<String> {
        match self {
            ProviderOutput::Url(url) if !url.is_empty() => Ok(url),
            ProviderOutput::Url(_) => {
                Err(AppError::UnrecognizedOutput("empty output string".to_string()))
            }
            ProviderOutput::Many(urls) => urls
                .into_iter()
                .find(|u| !u.is_empty())
                .ok_or_else(|| AppError::UnrecognizedOutput("empty output list".to_string())),
            ProviderOutput::Object(object) => object
                .href
                .or(object.url)
                .filter(|u| !u.is_empty())
                .ok_or_else(|| {
                    AppError::UnrecognizedOutput(
                        "output object has no resolvable location".to_string(),
                    )
                }),
        }
    }
}

/// Trait for the external image generation capability.
///
/// Retry, backoff, and auth are the provider's own concern; the orchestrator
/// makes exactly one call per record.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Run one generation for the given prompt and reference images
    async fn generate(&self, prompt: &str, image_urls: &[String]) -> Result<ProviderOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_string_wins() {
        let output: ProviderOutput = serde_json::from_str("\"https://cdn/out.png\"").unwrap();
        assert_eq!(output.into_result_url().unwrap(), "https://cdn/out.png");
    }

    #[test]
    fn test_first_list_element_wins() {
        let output: ProviderOutput =
            serde_json::from_str("[\"https://cdn/1.png\", \"https://cdn/2.png\"]").unwrap();
        assert_eq!(output.into_result_url().unwrap(), "https://cdn/1.png");
    }

    #[test]
    fn test_href_takes_priority_over_url() {
        let output: ProviderOutput = serde_json::from_str(
            "{\"href\": \"https://cdn/href.png\", \"url\": \"https://cdn/url.png\"}",
        )
        .unwrap();
        assert_eq!(output.into_result_url().unwrap(), "https://cdn/href.png");
    }

    #[test]
    fn test_url_key_accepted() {
        let output: ProviderOutput =
            serde_json::from_str("{\"url\": \"https://cdn/url.png\"}").unwrap();
        assert_eq!(output.into_result_url().unwrap(), "https://cdn/url.png");
    }

    #[test]
    fn test_empty_list_is_unrecognized() {
        let output: ProviderOutput = serde_json::from_str("[]").unwrap();
        assert!(matches!(
            output.into_result_url(),
            Err(AppError::UnrecognizedOutput(_))
        ));
    }

    #[test]
    fn test_bare_object_is_unrecognized() {
        let output: ProviderOutput = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            output.into_result_url(),
            Err(AppError::UnrecognizedOutput(_))
        ));
    }

    #[test]
    fn test_empty_string_is_unrecognized() {
        let output = ProviderOutput::Url(String::new());
        assert!(matches!(
            output.into_result_url(),
            Err(AppError::UnrecognizedOutput(_))
        ));
    }
}
