//! Upload routes.
//!
//! `POST /upload` serves the HTML form and always answers with a redirect
//! back to `/`; `POST /api/v1/uploads` is the same intake with JSON replies.

use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::Redirect,
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use intake_core::storage::{StoredUpload, UPLOAD_FAILED, UploadError, UploadResult};

use crate::{
    AppState,
    error::ApiError,
    flash::{self, Flash},
    intake::{log_outcome, receive_upload},
};

/// Form post target.
pub fn form_routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_form))
}

/// JSON API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/uploads", post(upload_json))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a stored upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Name the client supplied.
    pub declared_name: String,
    /// File name inside the storage root.
    pub storage_key: String,
    /// Bytes stored.
    pub size: u64,
}

impl From<StoredUpload> for UploadResponse {
    fn from(stored: StoredUpload) -> Self {
        Self {
            declared_name: stored.declared_name,
            storage_key: stored.storage_key,
            size: stored.size,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Success notice for the form flow.
fn success_message(declared_name: &str) -> String {
    format!("File uploaded successfully: {declared_name}")
}

async fn intake(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadResult {
    let result = match multipart {
        Ok(multipart) => receive_upload(state.writer.clone(), multipart).await,
        Err(rejection) => Err(UploadError::aborted(
            "",
            format!("not a multipart form: {}", rejection.body_text()),
        )),
    };
    log_outcome(&result);
    result
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/upload`
/// Store the `peFile` field and redirect home with a flash message.
async fn upload_form(
    State(state): State<AppState>,
    jar: CookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> (CookieJar, Redirect) {
    let flash = match intake(&state, multipart).await {
        Ok(stored) => Flash::message(success_message(&stored.declared_name)),
        Err(_) => Flash::error(UPLOAD_FAILED),
    };
    (flash::put(jar, &flash), Redirect::to("/"))
}

/// POST `/api/v1/uploads`
/// Store the `peFile` field and describe the result as JSON.
async fn upload_json(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let stored = intake(&state, multipart).await?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}
