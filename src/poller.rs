//! Client-side polling over the generation API
//!
//! The poller observes record state through repeated idempotent reads; it
//! never mutates anything. Abandoning a poll has no effect on the record,
//! the orchestrator runs every job to a terminal state regardless.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::generation::record::GenerationRecord;

/// Polling intervals
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Interval between reads of a single record
    pub record_interval: Duration,
    /// Interval between recency-list fetches
    pub list_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            record_interval: Duration::from_secs(2),
            list_interval: Duration::from_secs(5),
        }
    }
}

/// Polls the HTTP surface until a record reaches a terminal state
pub struct GenerationPoller {
    client: Client,
    base_url: String,
    config: PollerConfig,
}

impl GenerationPoller {
    /// Create a poller with default intervals
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, PollerConfig::default())
    }

    /// Create a poller with custom intervals
    pub fn with_config(base_url: impl Into<String>, config: PollerConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        }
    }

    /// Fetch a single record
    pub async fn fetch(&self, id: &str) -> Result<Option<GenerationRecord>> {
        let url = format!("{}/api/generations/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(AppError::Internal(format!(
                "Unexpected status {} while polling {}",
                status, url
            ))),
        }
    }

    /// Fetch the recency listing once
    pub async fn recent(&self) -> Result<Vec<GenerationRecord>> {
        let url = format!("{}/api/generations", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "Unexpected status {} while fetching {}",
                status, url
            )));
        }

        Ok(response.json().await?)
    }

    /// Re-read the record on the configured interval until it reaches a
    /// terminal state, then return it.
    ///
    /// A "not found" on the very first read is tolerated as a race between
    /// record creation and the first poll; on any later read it is a hard
    /// error.
    pub async fn wait_for_terminal(&self, id: &str) -> Result<GenerationRecord> {
        let mut ticker = tokio::time::interval(self.config.record_interval);
        let mut first_poll = true;

        loop {
            ticker.tick().await;

            match self.fetch(id).await? {
                Some(record) if record.status.is_terminal() => {
                    debug!(id = %id, status = ?record.status, "Record reached terminal state");
                    return Ok(record);
                }
                Some(record) => {
                    debug!(id = %id, status = ?record.status, "Record still in flight");
                }
                None if first_poll => {
                    debug!(id = %id, "Record not visible yet, retrying");
                }
                None => {
                    return Err(AppError::NotFound(format!("Generation '{}' not found", id)));
                }
            }

            first_poll = false;
        }
    }

    /// Fetch the recency listing on the configured interval, handing each
    /// batch to the callback until it returns `false`.
    pub async fn watch_recent<F>(&self, mut on_batch: F) -> Result<()>
    where
        F: FnMut(Vec<GenerationRecord>) -> bool,
    {
        let mut ticker = tokio::time::interval(self.config.list_interval);

        loop {
            ticker.tick().await;

            let batch = self.recent().await?;
            if !on_batch(batch) {
                return Ok(());
            }
        }
    }
}
