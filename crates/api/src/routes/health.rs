//! Health check endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy` when uploads can be stored, `degraded` otherwise.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether the storage root currently exists as a directory.
    pub storage_ready: bool,
}

/// Health check handler. Does not create the storage root.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let root = state.writer.root().path().to_path_buf();
    let storage_ready = tokio::fs::metadata(root)
        .await
        .is_ok_and(|meta| meta.is_dir());

    Json(HealthResponse {
        status: if storage_ready { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        storage_ready,
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
