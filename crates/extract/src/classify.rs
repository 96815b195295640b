use crate::consts::DVE_FILENAME;
use crate::error::{ErrorKind, Result};
use crate::models::{DatasetVersion, Extension, FilenameAttributes};
use exn::{OptionExt, ResultExt};
use regex::{Captures, Regex};
use std::path::Path;

/// Parses Dataset Version Export filenames.
///
/// Compile once at start-up and share; classification itself is just a
/// regex match.
#[derive(Clone, Debug)]
pub struct Classifier {
    pattern: Regex,
}
impl Classifier {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(DVE_FILENAME).or_raise(|| ErrorKind::ParseError {
            field: "filename pattern",
            value: DVE_FILENAME.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// Splits `filename` into its dataset PID and version.
    ///
    /// The whole name must match; there is no such thing as a partially
    /// classified export.
    pub fn classify(&self, filename: impl AsRef<str>) -> Result<FilenameAttributes> {
        let filename = filename.as_ref();
        let invalid = || ErrorKind::InvalidFilename(filename.to_string());
        let captures = self.pattern.captures(filename).ok_or_raise(invalid)?;
        let identifier = group(&captures, "doi").ok_or_raise(invalid)?;
        let extension = match group(&captures, "extension") {
            Some("zip") => Extension::Zip,
            Some("xml") => Extension::Xml,
            _ => exn::bail!(invalid()),
        };

        Ok(FilenameAttributes {
            dataset_pid: dataset_pid(identifier),
            version: DatasetVersion::new(number(&captures, "major")?, number(&captures, "minor")?),
            identifier: identifier.to_string(),
            schema: group(&captures, "schema").map(str::to_string),
            extension,
        })
    }

    /// Same as [`classify`](Self::classify), for the last component of `path`.
    pub fn classify_path(&self, path: impl AsRef<Path>) -> Result<FilenameAttributes> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_raise(|| ErrorKind::InvalidFilename(path.to_string_lossy().into_owned()))?;
        self.classify(filename)
    }

    /// An export the pipeline should pick up: a correctly named zip.
    ///
    /// Sidecar `.xml` descriptors follow the same naming convention but are
    /// never processed on their own.
    pub fn is_dve(&self, path: impl AsRef<Path>) -> bool {
        self.classify_path(path).is_ok_and(|attributes| attributes.extension == Extension::Zip)
    }
}

fn group<'h>(captures: &Captures<'h>, name: &str) -> Option<&'h str> {
    captures.name(name).map(|m| m.as_str())
}

fn number(captures: &Captures<'_>, name: &'static str) -> Result<u32> {
    let value = group(captures, name).unwrap_or_default();
    value.parse::<u32>().or_raise(|| ErrorKind::ParseError { field: name, value: value.to_string() })
}

/// `doi-10-5072-fk2-xcfq1b` becomes `10.5072/FK2/XCFQ1B`: the first separator
/// after the prefix is the DOI's dot, every following one a slash.
fn dataset_pid(identifier: &str) -> String {
    let body = identifier.strip_prefix("doi-").unwrap_or(identifier).to_uppercase();
    match body.split_once('-') {
        Some((prefix, suffix)) => format!("{prefix}.{}", suffix.replace('-', "/")),
        None => body,
    }
}
