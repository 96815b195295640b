//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Apart from [`Filesystem`](Self::Filesystem), none of them will go away by
/// trying again: the export is either well-formed or it isn't.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The filename does not follow the DVE naming convention.
    #[display("not a Dataset Version Export filename: {_0}")]
    InvalidFilename(#[error(not(source))] String),
    /// Filesystem attributes could not be read.
    #[display("could not read file attributes: {}", _0.display())]
    Filesystem(#[error(not(source))] PathBuf),
    /// The archive could not be opened or one of its entries could not be read.
    #[display("unreadable archive: {}", _0.display())]
    Archive(#[error(not(source))] PathBuf),
    /// A required archive entry is missing.
    #[display("missing archive entry: {_0}")]
    MissingEntry(#[error(not(source))] &'static str),
    /// More than one archive entry matches where exactly one is expected.
    #[display("expected exactly one '{entry}' entry, found {count}")]
    AmbiguousEntry { entry: &'static str, count: usize },
    /// The metadata document is not valid JSON.
    #[display("malformed metadata document: {_0}")]
    MalformedDocument(#[error(not(source))] String),
    /// A required field could not be found in the metadata document.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending value.
        value: String,
    },
    /// Reading an export failed; the children of this error say which step.
    #[display("could not read Dataset Version Export: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Filesystem(_))
    }
}
