//! Storage data types.

use std::io::Read;
use std::path::{Path, PathBuf};

use super::error::UploadError;

/// Directory under which all uploaded files are placed.
///
/// Fixed at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot(PathBuf);

impl StorageRoot {
    /// Create a storage root. An empty path means the working directory.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.as_os_str().is_empty() {
            Self(PathBuf::from("."))
        } else {
            Self(path)
        }
    }

    /// Filesystem path of the root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for StorageRoot {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

/// A single upload handed over by the HTTP layer.
///
/// The source is read once, to the end.
#[derive(Debug)]
pub struct UploadRequest<R> {
    /// Upload contents.
    pub source: R,
    /// Client-supplied filename. Untrusted.
    pub declared_name: String,
}

impl<R: Read> UploadRequest<R> {
    /// Create a new upload request.
    #[must_use]
    pub fn new(source: R, declared_name: impl Into<String>) -> Self {
        Self {
            source,
            declared_name: declared_name.into(),
        }
    }
}

/// A file that was stored successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Full path of the stored file.
    pub stored_path: PathBuf,
    /// File name inside the storage root.
    pub storage_key: String,
    /// Name the client supplied, kept for display.
    pub declared_name: String,
    /// Number of bytes written.
    pub size: u64,
}

/// Outcome of a single upload.
pub type UploadResult = Result<StoredUpload, UploadError>;
