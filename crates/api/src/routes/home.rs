//! Upload form page.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use intake_core::storage::DirectoryProvisioner;

use crate::{AppState, flash, pages};

/// Shown when the storage root cannot be provisioned.
pub const NOT_READY: &str =
    "The server is not ready to accept uploads. Please contact the administrator.";

/// Creates the home page route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(home))
}

/// GET `/`
/// Provision the storage root and render the form with any pending flash.
async fn home(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, flash) = flash::take(jar);

    let root = state.writer.root().clone();
    let provisioned = tokio::task::spawn_blocking(move || DirectoryProvisioner::ensure(&root)).await;
    let page_error = match provisioned {
        Ok(Ok(())) => None,
        Ok(Err(e)) => {
            error!(error = %e, "Failed to provision storage root");
            Some(NOT_READY)
        }
        Err(e) => {
            error!(error = %e, "Storage provisioning task failed");
            Some(NOT_READY)
        }
    };

    match pages::home(flash.as_ref(), page_error) {
        Ok(html) => (jar, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render home page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
