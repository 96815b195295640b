//! Pipeline Error Types
//!
//! Each kind names the step that failed; the error tree underneath carries
//! the detail from the crate that actually failed.

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Components could not be built from the configuration.
    #[display("could not set up the pipeline")]
    Setup,
    #[display("could not read export")]
    Read,
    #[display("could not project dataset metadata")]
    Project,
    /// A migrated dataset's modification date is needed for the cutoff check.
    #[display("modification date is missing or not understood: {_0}")]
    UnknownModified(#[error(not(source))] String),
    #[display("could not build deposit")]
    Deposit,
    #[display("could not place export in the mirror store")]
    Store,
    #[display("could not delete discarded export")]
    Discard,
    /// The file's final location is unknown; it needs an operator.
    #[display("could not quarantine {}", _0.display())]
    Quarantine(#[error(not(source))] PathBuf),
    /// An inbox could not be listed. Fatal to the service.
    #[display("could not list inbox {}", _0.display())]
    Inbox(#[error(not(source))] PathBuf),
    #[display("could not dispatch {}", _0.display())]
    Dispatch(#[error(not(source))] PathBuf),
    /// A worker thread panicked or was cancelled.
    #[display("worker did not finish")]
    Worker,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }
}
