//! Route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod home;
pub mod uploads;

/// Browser-facing routes: the form page and its post target.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .merge(home::routes())
        .merge(uploads::form_routes())
}

/// JSON API routes, nested under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(uploads::api_routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared helpers for router tests.

    use std::path::Path;

    use axum::{
        Router,
        body::Body,
        http::{Request, Response, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use intake_shared::{NamingStrategy, StorageSettings};

    use crate::{AppState, create_router};

    pub const BOUNDARY: &str = "----intake-test-boundary";

    pub fn app_with_root(root: &Path) -> Router {
        let settings = StorageSettings {
            root: root.to_path_buf(),
            naming: NamingStrategy::Declared,
            max_upload_bytes: 1024 * 1024,
        };
        create_router(AppState::from_settings(&settings))
    }

    /// A form with one file part.
    pub fn file_form(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    /// A form with one text part and no file.
    pub fn text_form(field: &str, value: &str) -> Vec<u8> {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{BOUNDARY}--\r\n"
        )
        .into_bytes()
    }

    pub async fn post_form(app: Router, uri: &str, body: Vec<u8>) -> Response<Body> {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    pub async fn body_string(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Value of the first `Set-Cookie` header for `name`.
    pub fn set_cookie_value<B>(response: &Response<B>, name: &str) -> Option<String> {
        response
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| {
                let pair = v.split(';').next()?;
                let (key, value) = pair.split_once('=')?;
                (key.trim() == name).then(|| value.trim().to_string())
            })
    }
}
