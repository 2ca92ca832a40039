//! Request handlers for the generation API

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::generation::record::{GenerationRecord, GenerationRequest};
use crate::generation::validate::validate_request;
use crate::upload;
use crate::AppState;

#[derive(Serialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
}

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /api/generations` — most recent records, newest first
pub async fn list_generations(State(state): State<Arc<AppState>>) -> Json<Vec<GenerationRecord>> {
    Json(state.store.recent(state.settings.server.recent_limit))
}

/// `GET /api/generations/{id}` — one record or 404
pub async fn get_generation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GenerationRecord>> {
    state
        .store
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Generation '{}' not found", id)))
}

/// `POST /api/generations` — validate, create a pending record, and return it
/// before the generation itself runs
pub async fn create_generation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> Result<(StatusCode, Json<GenerationRecord>)> {
    validate_request(&request)?;

    let record = state.orchestrator.submit(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /api/uploads` — multipart files in, storable data-URL references out
pub async fn upload_images(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let limits = &state.settings.uploads;
    let mut urls = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        if urls.len() >= limits.max_files {
            return Err(AppError::InvalidRequest(format!(
                "At most {} files may be uploaded at once",
                limits.max_files
            )));
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("Failed to read upload: {}", e)))?;

        if data.is_empty() {
            return Err(AppError::InvalidRequest("Uploaded file is empty".to_string()));
        }

        if data.len() > limits.max_file_size_bytes {
            return Err(AppError::InvalidRequest(format!(
                "File exceeds the {} byte limit",
                limits.max_file_size_bytes
            )));
        }

        urls.push(upload::to_data_url(&content_type, &data));
    }

    if urls.is_empty() {
        return Err(AppError::InvalidRequest("No files uploaded".to_string()));
    }

    debug!(count = urls.len(), "Stored uploaded files as data URLs");
    Ok(Json(UploadResponse { urls }))
}
