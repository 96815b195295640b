//! Builds small zip archives on disk for tests.

use std::fs::File;
use std::io::Write;
use std::path::Path;
pub use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// An in-memory list of entries that can be written out as a zip archive.
#[derive(Clone, Debug, Default)]
pub struct MockArchive {
    entries: Vec<(String, Vec<u8>)>,
}
impl MockArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: impl Into<String>, data: impl AsRef<[u8]>) -> Self {
        self.entries.push((name.into(), data.as_ref().to_vec()));
        self
    }

    /// Writes every entry, deflated, in insertion order.
    pub fn write(&self, path: impl AsRef<Path>) -> ZipResult<()> {
        let mut zip = ZipWriter::new(File::create(path)?);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }
}
