//! Everything the pipeline learns about a Dataset Version Export before it
//! decides what to do with it.
//!
//! - [`Classifier`] parses the filename (`doi-10-5072-fk2-xcfq1bv1.0.zip`)
//!   into a dataset PID and version.
//! - [`Reader`] combines that with filesystem attributes and the metadata
//!   found inside the archive.
//! - [`Projector`] turns the embedded JSON-LD into a template-ready
//!   [`DatasetMetadata`](models::DatasetMetadata) record.
//!
//! Patterns and formats are compiled once, on construction, and shared by
//! reference afterwards.

mod classify;
mod consts;
pub mod error;
mod lookup;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod models;
mod project;
mod reader;
mod timestamp;

pub use crate::classify::Classifier;
pub use crate::project::Projector;
pub use crate::reader::Reader;
pub use crate::timestamp::TimestampFormat;
