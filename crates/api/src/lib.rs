//! HTTP layer with Axum routes.
//!
//! This crate provides:
//! - The upload form page and its post/redirect/get flow
//! - A JSON upload API
//! - Streaming of multipart fields into the blocking upload writer

pub mod error;
pub mod flash;
pub mod intake;
pub mod pages;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use intake_core::storage::{StorageRoot, UploadWriter};
use intake_shared::StorageSettings;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Writer for uploaded files.
    pub writer: Arc<UploadWriter>,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Build state from storage settings.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        let root = StorageRoot::new(settings.root.clone());
        Self {
            writer: Arc::new(UploadWriter::new(root, settings.naming)),
            max_upload_bytes: settings.max_upload_bytes,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::page_routes())
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
