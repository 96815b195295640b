use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// No home directory to derive the default location from.
    #[display("could not determine the configuration directory")]
    NoConfigDir,
    #[display("could not parse configuration: {}", _0.display())]
    Parse(#[error(not(source))] PathBuf),
    #[display("invalid configuration value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ErrorKind {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid { key: key.into(), reason: reason.into() }
    }
}
