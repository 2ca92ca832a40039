//! Generation record types and lifecycle states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a generation record.
///
/// Transitions are one-directional: `Pending -> Processing -> {Completed | Failed}`.
/// Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Incoming request to create a generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    // Defaulted so an omitted key reaches validation and is reported as a
    // field error rather than a deserialization rejection
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// One prompt-plus-images request tracked through to a result or failure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: String,
    pub prompt: String,
    pub image_urls: Vec<String>,
    pub status: GenerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl GenerationRecord {
    /// Create a fresh pending record with a generated identity
    pub fn new(prompt: String, image_urls: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt,
            image_urls,
            status: GenerationStatus::Pending,
            result_url: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Partial-field update applied by the orchestrator.
///
/// Absent fields are left untouched by the store's merge.
#[derive(Debug, Clone, Default)]
pub struct GenerationUpdate {
    pub status: Option<GenerationStatus>,
    pub result_url: Option<String>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GenerationUpdate {
    pub fn processing() -> Self {
        Self {
            status: Some(GenerationStatus::Processing),
            ..Default::default()
        }
    }

    pub fn completed(result_url: String) -> Self {
        Self {
            status: Some(GenerationStatus::Completed),
            result_url: Some(result_url),
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn failed(message: String) -> Self {
        Self {
            status: Some(GenerationStatus::Failed),
            error: Some(message),
            completed_at: Some(Utc::now()),
            ..Default::default()
        }
    }
}
