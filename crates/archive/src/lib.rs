//! Read-only access to zip archives.
//!
//! A Dataset Version Export is a zipped bag. The pipeline never extracts it;
//! it only needs to list entry names and pull a handful of small metadata
//! entries into memory, so that's all [`Archive`] offers.

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::instrument;
use zip::ZipArchive;

/// An opened zip archive.
pub struct Archive {
    zip: ZipArchive<BufReader<File>>,
}
impl Archive {
    /// Opens the archive at `path` and reads its central directory.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ErrorKind::from_io(e, path))?;
        let zip = ZipArchive::new(BufReader::new(file)).or_raise(|| ErrorKind::InvalidArchive(path.to_path_buf()))?;
        tracing::trace!(entries = zip.len(), "Opened archive");
        Ok(Self { zip })
    }

    /// Full in-archive names of every entry, in central directory order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.zip.file_names()
    }

    /// Names of all entries accepted by `predicate`.
    pub fn find(&self, predicate: impl Fn(&str) -> bool) -> Vec<String> {
        self.entries().filter(|name| predicate(name)).map(str::to_string).collect()
    }

    /// Reads the first entry whose full in-archive path ends with `suffix`.
    ///
    /// Bags are zipped with their top-level directory included, so callers
    /// rarely know the full name of an entry: `metadata/pid-mapping.txt`
    /// matches `doi-10-5072-fk2-xcfq1bv1.0/metadata/pid-mapping.txt`.
    pub fn read_entry(&mut self, suffix: impl AsRef<str>) -> Result<Vec<u8>> {
        let suffix = suffix.as_ref();
        let name = self
            .entries()
            .find(|name| name.ends_with(suffix))
            .map(str::to_string)
            .ok_or_raise(|| ErrorKind::EntryNotFound(suffix.to_string()))?;
        self.read_exact(name)
    }

    /// Reads the entry with exactly this in-archive name.
    pub fn read_exact(&mut self, name: impl AsRef<str>) -> Result<Vec<u8>> {
        let name = name.as_ref();
        let mut entry = self.zip.by_name(name).or_raise(|| ErrorKind::EntryNotFound(name.to_string()))?;
        let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or_default());
        entry.read_to_end(&mut data).or_raise(|| ErrorKind::CorruptEntry(name.to_string()))?;
        Ok(data)
    }
}
