//! Storage error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use intake_shared::AppError;
use serde::Serialize;
use thiserror::Error;

use super::naming::InvalidName;

/// Generic text returned to clients for any failed upload, whatever its kind.
pub const UPLOAD_FAILED: &str =
    "An error occurred while uploading the file. Please check the server logs.";

/// The storage root could not be created or is not a directory.
#[derive(Debug, Error)]
#[error("storage root {} is unavailable: {source}", .path.display())]
pub struct DirectoryUnavailable {
    /// Root that was being provisioned.
    pub path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    pub source: io::Error,
}

/// Failure category of an upload, used for logs and API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Storage root could not be provisioned.
    DirectoryUnavailable,
    /// I/O failure while transferring the stream.
    WriteError,
    /// Anything else: bad name, malformed stream, aborted handler.
    UnexpectedError,
}

impl FailureKind {
    /// Stable identifier of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectoryUnavailable => "directory_unavailable",
            Self::WriteError => "write_error",
            Self::UnexpectedError => "unexpected_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an upload ended in [`FailureKind::UnexpectedError`].
#[derive(Debug, Error)]
pub enum UnexpectedCause {
    /// The declared name cannot be used as a file name.
    #[error("invalid declared name: {0}")]
    InvalidName(#[from] InvalidName),

    /// The source stream reported corrupt or undecodable data.
    #[error("malformed upload stream: {0}")]
    MalformedStream(#[source] io::Error),

    /// The caller could not complete the intake.
    #[error("{0}")]
    Aborted(String),
}

/// Upload operation errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Storage root is unavailable; nothing was transferred.
    #[error("cannot store {declared_name:?}: {source}")]
    DirectoryUnavailable {
        /// Client-supplied name.
        declared_name: String,
        /// Provisioning failure.
        #[source]
        source: DirectoryUnavailable,
    },

    /// Transfer to disk failed.
    #[error("failed to write {declared_name:?}: {source}")]
    Write {
        /// Client-supplied name.
        declared_name: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Any other failure.
    #[error("unexpected failure storing {declared_name:?}: {cause}")]
    Unexpected {
        /// Client-supplied name.
        declared_name: String,
        /// What went wrong.
        #[source]
        cause: UnexpectedCause,
    },
}

impl UploadError {
    /// Create an unexpected error for failures outside the writer.
    #[must_use]
    pub fn aborted(declared_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unexpected {
            declared_name: declared_name.into(),
            cause: UnexpectedCause::Aborted(reason.into()),
        }
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::DirectoryUnavailable { .. } => FailureKind::DirectoryUnavailable,
            Self::Write { .. } => FailureKind::WriteError,
            Self::Unexpected { .. } => FailureKind::UnexpectedError,
        }
    }

    /// Name the client supplied for the failed upload.
    #[must_use]
    pub fn declared_name(&self) -> &str {
        match self {
            Self::DirectoryUnavailable { declared_name, .. }
            | Self::Write { declared_name, .. }
            | Self::Unexpected { declared_name, .. } => declared_name,
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let message = UPLOAD_FAILED.to_string();
        match err {
            UploadError::DirectoryUnavailable { .. } => Self::ServiceUnavailable(message),
            UploadError::Write { source, .. } if source.kind() == io::ErrorKind::FileTooLarge => {
                Self::PayloadTooLarge(message)
            }
            UploadError::Write { .. } => Self::Storage(message),
            UploadError::Unexpected {
                cause: UnexpectedCause::InvalidName(_),
                ..
            } => Self::Validation(message),
            UploadError::Unexpected { .. } => Self::Internal(message),
        }
    }
}
