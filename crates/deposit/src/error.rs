//! Deposit Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A deposit error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for deposit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Template was not loadable (either file or builtin).
    #[display("template not found: {_0}")]
    TemplateNotFound(#[error(not(source))] String),
    /// Template could not be compiled. Fix the template; don't retry.
    #[display("template contains syntax errors: {_0}")]
    TemplateSyntax(#[error(not(source))] String),
    /// Rendering a compiled template failed.
    #[display("could not render {_0}")]
    Render(#[error(not(source))] String),
    /// Unknown checksum algorithm name.
    #[display("unsupported checksum algorithm: {_0}")]
    UnsupportedAlgorithm(#[error(not(source))] String),
    /// Writing part of the deposit failed.
    #[display("could not write {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// The finished deposit could not be moved into the outbox.
    #[display("could not move deposit into outbox: {}", _0.display())]
    Publish(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Publish(_))
    }
}
