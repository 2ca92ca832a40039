//! Image Generation Relay
//!
//! A small web service that accepts prompt-plus-reference-image requests,
//! tracks each one as an in-memory generation record, and drives it through
//! an external hosted image model asynchronously while clients poll for the
//! terminal outcome.

pub mod api;
pub mod config;
pub mod error;
pub mod generation;
pub mod poller;
pub mod provider;
pub mod upload;

pub use error::{AppError, Result};

use std::sync::Arc;

use generation::orchestrator::Orchestrator;
use generation::store::GenerationStore;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub store: Arc<GenerationStore>,
    pub orchestrator: Arc<Orchestrator>,
}
