//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Messages carried here are shown to clients, so they must never contain
/// filesystem paths or low-level causes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A dependency of the service is not ready (e.g. the storage root).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Request body exceeded the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::ServiceUnavailable(_) => 503,
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the client-facing message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::PayloadTooLarge(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Storage(msg)
            | Self::Internal(msg) => msg,
        }
    }
}
