//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Archive file does not exist.
    #[display("archive not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied while opening the archive.
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error.
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The file exists but is not a readable zip archive. Don't retry.
    #[display("not a valid zip archive: {}", _0.display())]
    InvalidArchive(#[error(not(source))] PathBuf),
    /// No entry in the archive matched the requested name or suffix.
    #[display("no archive entry matches '{_0}'")]
    EntryNotFound(#[error(not(source))] String),
    /// The entry exists but its data could not be decompressed.
    #[display("corrupt archive entry: {_0}")]
    CorruptEntry(#[error(not(source))] String),
}

impl ErrorKind {
    pub(crate) fn from_io(e: IoError, path: &Path) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(e),
        }
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::EntryNotFound("metadata/pid-mapping.txt".to_string()).to_string(),
            "no archive entry matches 'metadata/pid-mapping.txt'"
        );
        assert_eq!(
            ErrorKind::InvalidArchive(PathBuf::from("/tmp/a.zip")).to_string(),
            "not a valid zip archive: /tmp/a.zip"
        );
    }

    #[test]
    fn io_errors_are_mapped_by_kind() {
        let path = Path::new("/tmp/missing.zip");
        let err = ErrorKind::from_io(IoError::new(std::io::ErrorKind::NotFound, "nope"), path);
        assert!(matches!(err, ErrorKind::NotFound(p) if p == path));
        let err = ErrorKind::from_io(IoError::other("disk on fire"), path);
        assert!(err.is_retryable());
    }
}
