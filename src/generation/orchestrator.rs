//! Asynchronous orchestration of the generation lifecycle
//!
//! The submit path creates a `pending` record and hands a job description to
//! a worker task over a channel; the caller gets the record back immediately
//! and never observes the outcome of the external call directly. Every job
//! ends in a terminal record state, success or failure alike.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::generation::record::{GenerationRecord, GenerationRequest, GenerationUpdate};
use crate::generation::store::GenerationStore;
use crate::provider::GenerationProvider;

/// Job description handed from the submit path to the worker
#[derive(Debug)]
struct GenerationJob {
    id: String,
    prompt: String,
    image_urls: Vec<String>,
}

/// Configuration for the orchestration queue
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Capacity of the submit-to-worker channel
    pub queue_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

/// Drives generation records through `pending -> processing -> terminal`
pub struct Orchestrator {
    store: Arc<GenerationStore>,
    job_tx: mpsc::Sender<GenerationJob>,
}

impl Orchestrator {
    /// Create a new orchestrator with default configuration
    pub fn new(store: Arc<GenerationStore>, provider: Arc<dyn GenerationProvider>) -> Self {
        Self::with_config(store, provider, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration
    pub fn with_config(
        store: Arc<GenerationStore>,
        provider: Arc<dyn GenerationProvider>,
        config: OrchestratorConfig,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel(config.queue_capacity);
        let worker_store = store.clone();

        // Start the worker task
        tokio::spawn(async move {
            Self::process_jobs(job_rx, worker_store, provider).await;
        });

        Self { store, job_tx }
    }

    /// Accept a validated request: store a `pending` record, enqueue the job,
    /// and return the record without waiting for the generation to run.
    pub async fn submit(&self, request: GenerationRequest) -> Result<GenerationRecord> {
        let record = self
            .store
            .create(request.prompt.clone(), request.image_urls.clone());

        let job = GenerationJob {
            id: record.id.clone(),
            prompt: request.prompt,
            image_urls: request.image_urls,
        };

        self.job_tx
            .send(job)
            .await
            .map_err(|_| AppError::Internal("Generation worker is not running".to_string()))?;

        debug!(id = %record.id, "Generation queued");
        Ok(record)
    }

    /// Receive jobs and run each one on its own task. Jobs are independent;
    /// nothing is shared between them beyond the store.
    async fn process_jobs(
        mut job_rx: mpsc::Receiver<GenerationJob>,
        store: Arc<GenerationStore>,
        provider: Arc<dyn GenerationProvider>,
    ) {
        while let Some(job) = job_rx.recv().await {
            let store = store.clone();
            let provider = provider.clone();

            tokio::spawn(async move {
                Self::run_job(job, store, provider).await;
            });
        }
    }

    /// Execute one job to a terminal state. All failure paths, transport
    /// errors and unrecognized output shapes included, end in `failed`;
    /// nothing escapes back to the submit path.
    async fn run_job(
        job: GenerationJob,
        store: Arc<GenerationStore>,
        provider: Arc<dyn GenerationProvider>,
    ) {
        if store.update(&job.id, GenerationUpdate::processing()).is_none() {
            warn!(id = %job.id, "Job refers to a record that is no longer stored");
            return;
        }

        debug!(id = %job.id, "Generation started");

        let outcome = match provider.generate(&job.prompt, &job.image_urls).await {
            Ok(output) => output.into_result_url(),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result_url) => {
                debug!(id = %job.id, result_url = %result_url, "Generation completed");
                if store
                    .update(&job.id, GenerationUpdate::completed(result_url))
                    .is_none()
                {
                    warn!(id = %job.id, "Completed job targeted an unknown record");
                }
            }
            Err(e) => {
                warn!(id = %job.id, error = %e, "Generation failed");
                if store
                    .update(&job.id, GenerationUpdate::failed(e.to_string()))
                    .is_none()
                {
                    warn!(id = %job.id, "Failed job targeted an unknown record");
                }
            }
        }
    }
}
