//! Router assembly and shared HTTP layers

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers;
use crate::AppState;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Room for every file plus multipart framing overhead
    let upload_body_limit = state.settings.uploads.max_files
        * state.settings.uploads.max_file_size_bytes
        + 1024 * 1024;

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/generations",
            get(handlers::list_generations).post(handlers::create_generation),
        )
        .route("/api/generations/:id", get(handlers::get_generation))
        .route(
            "/api/uploads",
            post(handlers::upload_images).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
