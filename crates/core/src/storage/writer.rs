//! Upload writer: one stream in, one file (or one classified failure) out.

use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

use tempfile::Builder;
use tracing::debug;

use intake_shared::NamingStrategy;

use super::error::{UnexpectedCause, UploadError};
use super::naming::{PART_PREFIX, PART_SUFFIX, storage_key, validate_declared_name};
use super::provisioner::DirectoryProvisioner;
use super::types::{StorageRoot, StoredUpload, UploadRequest, UploadResult};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Writes uploads into the storage root.
///
/// Holds only immutable configuration, so one instance can serve every
/// request concurrently.
#[derive(Debug, Clone)]
pub struct UploadWriter {
    root: StorageRoot,
    naming: NamingStrategy,
}

/// Which side of the copy failed.
enum TransferError {
    Read(io::Error),
    Write(io::Error),
}

impl UploadWriter {
    /// Create a writer for the given root.
    #[must_use]
    pub fn new(root: StorageRoot, naming: NamingStrategy) -> Self {
        Self { root, naming }
    }

    /// The storage root this writer targets.
    #[must_use]
    pub fn root(&self) -> &StorageRoot {
        &self.root
    }

    /// The naming strategy in use.
    #[must_use]
    pub fn naming(&self) -> NamingStrategy {
        self.naming
    }

    /// Store one upload.
    ///
    /// The name and the storage key derived from it are validated before the
    /// filesystem is touched, the root is re-provisioned, and the stream is written to a temporary file that is
    /// synced and renamed over the destination. An existing file with the
    /// same storage key is replaced. On failure the temporary file is removed
    /// and the destination is left as it was.
    ///
    /// # Errors
    ///
    /// - [`UploadError::Unexpected`] for an unusable name or a malformed stream
    /// - [`UploadError::DirectoryUnavailable`] if the root cannot be provisioned
    /// - [`UploadError::Write`] for any I/O failure during the transfer
    pub fn write<R: Read>(&self, request: UploadRequest<R>) -> UploadResult {
        let UploadRequest {
            mut source,
            declared_name,
        } = request;

        let resolved = validate_declared_name(&declared_name)
            .and_then(|name| storage_key(self.naming, name));
        let storage_key = match resolved {
            Ok(key) => key,
            Err(reason) => {
                return Err(UploadError::Unexpected {
                    declared_name,
                    cause: reason.into(),
                });
            }
        };

        if let Err(source) = DirectoryProvisioner::ensure(&self.root) {
            return Err(UploadError::DirectoryUnavailable {
                declared_name,
                source,
            });
        }

        let stored_path = self.root.path().join(&storage_key);

        let size = match transfer(&mut source, self.root.path(), &stored_path) {
            Ok(size) => size,
            Err(TransferError::Read(e)) if is_malformed(&e) => {
                return Err(UploadError::Unexpected {
                    declared_name,
                    cause: UnexpectedCause::MalformedStream(e),
                });
            }
            Err(TransferError::Read(source) | TransferError::Write(source)) => {
                return Err(UploadError::Write {
                    declared_name,
                    source,
                });
            }
        };

        debug!(path = %stored_path.display(), size, "Upload written");

        Ok(StoredUpload {
            stored_path,
            storage_key,
            declared_name,
            size,
        })
    }
}

fn is_malformed(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::InvalidData | ErrorKind::InvalidInput)
}

fn transfer<R: Read>(source: &mut R, dir: &Path, dest: &Path) -> Result<u64, TransferError> {
    // Dropped (and deleted) on every early return.
    let mut part = Builder::new()
        .prefix(PART_PREFIX)
        .suffix(PART_SUFFIX)
        .tempfile_in(dir)
        .map_err(TransferError::Write)?;

    let size = copy(source, part.as_file_mut())?;
    part.as_file().sync_all().map_err(TransferError::Write)?;
    part.persist(dest)
        .map_err(|e| TransferError::Write(e.error))?;

    Ok(size)
}

fn copy<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> Result<u64, TransferError> {
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(TransferError::Write)?;
        total += n as u64;
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
