//! Declared-name validation and storage key resolution.

use thiserror::Error;
use uuid::Uuid;

use intake_shared::NamingStrategy;

/// Longest file name stored, in bytes. Matches common filesystem limits.
pub const MAX_NAME_LEN: usize = 255;

/// Prefix of in-flight transfer files inside the storage root.
pub(crate) const PART_PREFIX: &str = ".intake-";
/// Suffix of in-flight transfer files inside the storage root.
pub(crate) const PART_SUFFIX: &str = ".part";

/// Reasons a declared name cannot be used as a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidName {
    /// Empty or whitespace-only.
    #[error("file name is empty")]
    Empty,
    /// `.` or `..`.
    #[error("file name refers to a directory")]
    Reserved,
    /// Contains `/` or `\`.
    #[error("file name contains a path separator")]
    PathSeparator,
    /// Contains a NUL byte.
    #[error("file name contains a NUL byte")]
    Nul,
    /// Shaped like an in-flight transfer file.
    #[error("file name is reserved for transfers in progress")]
    TransferPattern,
    /// Stored name would be longer than [`MAX_NAME_LEN`] bytes.
    #[error("file name is longer than {max} bytes", max = MAX_NAME_LEN)]
    TooLong,
}

/// Check that a client-supplied name is a single, plain path segment.
///
/// Names are never rewritten: anything that could escape the storage root is
/// rejected outright.
///
/// # Errors
///
/// Returns the first rule the name violates.
pub fn validate_declared_name(name: &str) -> Result<&str, InvalidName> {
    if name.trim().is_empty() {
        return Err(InvalidName::Empty);
    }
    if name == "." || name == ".." {
        return Err(InvalidName::Reserved);
    }
    if name.contains(['/', '\\']) {
        return Err(InvalidName::PathSeparator);
    }
    if name.contains('\0') {
        return Err(InvalidName::Nul);
    }
    if name.starts_with(PART_PREFIX) && name.ends_with(PART_SUFFIX) {
        return Err(InvalidName::TransferPattern);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(InvalidName::TooLong);
    }
    Ok(name)
}

/// File name used inside the storage root for a validated declared name.
///
/// # Errors
///
/// [`InvalidName::TooLong`] when the strategy's decoration pushes the key
/// past [`MAX_NAME_LEN`].
pub(crate) fn storage_key(
    strategy: NamingStrategy,
    declared_name: &str,
) -> Result<String, InvalidName> {
    let key = match strategy {
        NamingStrategy::Declared => declared_name.to_string(),
        NamingStrategy::Generated => format!("{}_{declared_name}", Uuid::new_v4()),
    };
    if key.len() > MAX_NAME_LEN {
        return Err(InvalidName::TooLong);
    }
    Ok(key)
}
