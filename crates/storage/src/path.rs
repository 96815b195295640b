//! Path validation.
//!
//! Filenames handed to the store end up joined onto a root directory; make
//! sure they can't point anywhere else.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path};

/// Validates that `name` is a single, plain filename and returns it as a
/// string.
///
/// > **Note:** Null bytes are explicitly rejected; they pass through
/// >           `Path::components()` on Unix but truncate C-based syscalls.
///
/// # Examples
///
/// ```
/// use easymirror_storage::validate_filename;
/// assert!(validate_filename("doi-10-5072-fk2-xcfq1bv1.0.zip").is_ok());
/// assert!(validate_filename("store/doi-10-5072-fk2-xcfq1bv1.0.zip").is_err());
/// assert!(validate_filename("..").is_err());
/// ```
pub fn validate_filename(name: &(impl AsRef<Path> + ?Sized)) -> Result<&str> {
    let path = name.as_ref();
    let invalid = || ErrorKind::InvalidPath(path.to_path_buf());
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(s)), None) if !s.as_encoded_bytes().contains(&0) => match s.to_str() {
            Some(s) => Ok(s),
            None => exn::bail!(invalid()),
        },
        _ => exn::bail!(invalid()),
    }
}
