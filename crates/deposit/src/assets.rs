//! Templates embedded into the binary at compile time using
//! [`rust-embed`](rust_embed).

use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use rust_embed::Embed;
use std::borrow::Cow;

#[derive(Embed)]
#[folder = "../../assets/templates/"]
pub struct Builtins;
impl Builtins {
    /// Get the contents of a builtin template by name.
    pub fn load(name: impl AsRef<str>) -> Result<Cow<'static, [u8]>> {
        Self::get(name.as_ref()).map(|f| f.data).ok_or_raise(|| ErrorKind::TemplateNotFound(Self::identifier(name)))
    }

    pub(crate) fn identifier(name: impl AsRef<str>) -> String {
        format!("builtin:{}", name.as_ref().trim().trim_start_matches("builtin:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Deref;

    #[test]
    fn can_load_dataset_template() {
        let xml = Builtins::load("dataset.xml").unwrap();
        assert!(xml.starts_with(b"<?xml"));
    }

    #[test]
    fn unknown_builtin() {
        let err = Builtins::load("nope.xml").unwrap_err();
        assert_eq!(*err.deref(), ErrorKind::TemplateNotFound("builtin:nope.xml".to_string()));
    }
}
