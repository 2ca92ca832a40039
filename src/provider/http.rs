//! HTTP client for the hosted generation model

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::provider::{GenerationProvider, ProviderOutput};

/// Calls a hosted model over HTTP. The request carries the prompt and the
/// reference image URLs; the response body carries the generated output in
/// one of the shapes `ProviderOutput` knows about.
pub struct HttpProvider {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiGenerateRequest<'a> {
    prompt: &'a str,
    image_input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    output: Option<ProviderOutput>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl HttpProvider {
    /// Create a new provider client from configuration.
    ///
    /// The request timeout bounds the otherwise open-ended wait on the model;
    /// a timed-out call surfaces as an ordinary provider failure.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl GenerationProvider for HttpProvider {
    async fn generate(&self, prompt: &str, image_urls: &[String]) -> Result<ProviderOutput> {
        debug!(endpoint = %self.endpoint, "Sending generation request");

        let body = ApiGenerateRequest {
            prompt,
            image_input: image_urls,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(format!("Generation request timed out: {}", e))
            } else {
                AppError::Provider(format!("Generation request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Provider returned {}: {}",
                status, body
            )));
        }

        let api_response: ApiGenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse provider response: {}", e)))?;

        if let Some(message) = api_response.error.or(api_response.detail) {
            return Err(AppError::Provider(message));
        }

        api_response
            .output
            .ok_or_else(|| AppError::UnrecognizedOutput("response carried no output".to_string()))
    }
}
