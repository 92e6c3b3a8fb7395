//! Storage root provisioning.

use std::fs;

use tracing::debug;

use super::error::DirectoryUnavailable;
use super::types::StorageRoot;

/// Makes sure the storage root exists before anything is written to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryProvisioner;

impl DirectoryProvisioner {
    /// Create the storage root and any missing ancestors.
    ///
    /// Idempotent: an existing directory is left untouched. Safe to call from
    /// many requests at once; losing the creation race to another caller
    /// still counts as success.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryUnavailable`] if the root cannot be created or
    /// exists but is not a directory.
    pub fn ensure(root: &StorageRoot) -> Result<(), DirectoryUnavailable> {
        let path = root.path();
        if path.is_dir() {
            return Ok(());
        }

        match fs::create_dir_all(path) {
            Ok(()) => {
                debug!(root = %path.display(), "Created storage root");
                Ok(())
            }
            // Another request created it between the check and the create.
            Err(_) if path.is_dir() => Ok(()),
            Err(source) => Err(DirectoryUnavailable {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
