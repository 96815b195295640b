//! Filesystem side of the mirroring pipeline: the primitives used to hand
//! exports from one area to the next, and the [`MirrorStore`] they end up in.

pub mod error;
pub mod fs;
mod path;
mod store;

pub use crate::path::validate_filename;
pub use crate::store::MirrorStore;
