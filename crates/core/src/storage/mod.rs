//! Upload storage on the local filesystem.
//!
//! All uploads land in a single flat directory, the storage root:
//!
//! ```text
//! ┌──────────────┐   ensure()   ┌──────────────────────┐
//! │ UploadWriter │ ───────────▶ │ DirectoryProvisioner │
//! └──────┬───────┘              └──────────────────────┘
//!        │ validate name → resolve key → temp file → fsync → rename
//!        ▼
//!   {root}/{storage_key}
//! ```
//!
//! Every failure is classified into one of three [`FailureKind`]s so callers
//! can map the result to a user message without inspecting I/O errors.

mod error;
mod naming;
mod provisioner;
mod types;
mod writer;

pub use error::{
    DirectoryUnavailable, FailureKind, UPLOAD_FAILED, UnexpectedCause, UploadError,
};
pub use intake_shared::NamingStrategy;
pub use naming::{InvalidName, MAX_NAME_LEN, validate_declared_name};
pub use provisioner::DirectoryProvisioner;
pub use types::{StorageRoot, StoredUpload, UploadRequest, UploadResult};
pub use writer::UploadWriter;
