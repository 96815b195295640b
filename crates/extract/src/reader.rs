use crate::classify::Classifier;
use crate::consts::keys::*;
use crate::consts::{OAI_ORE_ENTRY, OAI_ORE_NAME, PID_MAPPING_ENTRY};
use crate::error::{ErrorKind, Result};
use crate::lookup::{first, single};
use crate::models::{ContentAttributes, DveMetadata, FilenameAttributes, FilesystemAttributes};
use easymirror_archive::Archive;
use easymirror_archive::error::ErrorKind as ArchiveErrorKind;
use exn::{OptionExt, ResultExt};
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::BufReader;
use std::ops::Deref;
use std::path::Path;
use time::OffsetDateTime;
use tracing::instrument;

/// Reads the three attribute bundles of a Dataset Version Export.
#[derive(Clone, Debug)]
pub struct Reader {
    classifier: Classifier,
    metadata_entry: Regex,
}
impl Reader {
    pub fn new(classifier: Classifier) -> Result<Self> {
        let metadata_entry = Regex::new(OAI_ORE_ENTRY)
            .or_raise(|| ErrorKind::ParseError { field: "metadata entry pattern", value: OAI_ORE_ENTRY.to_string() })?;
        Ok(Self { classifier, metadata_entry })
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Reads everything needed to decide what to do with an export. All
    /// three steps must succeed.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read(&self, path: impl AsRef<Path>) -> Result<DveMetadata> {
        let path = path.as_ref();
        let read = || -> Result<DveMetadata> {
            Ok(DveMetadata {
                filename: self.filename_attributes(path)?,
                filesystem: self.filesystem_attributes(path)?,
                content: self.content_attributes(path)?,
            })
        };
        read().or_raise(|| ErrorKind::Unreadable(path.to_path_buf()))
    }

    pub fn filename_attributes(&self, path: impl AsRef<Path>) -> Result<FilenameAttributes> {
        self.classifier.classify_path(path)
    }

    pub fn filesystem_attributes(&self, path: impl AsRef<Path>) -> Result<FilesystemAttributes> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).or_raise(|| ErrorKind::Filesystem(path.to_path_buf()))?;
        Ok(FilesystemAttributes {
            // Unsupported on some platforms and filesystems; that's fine here.
            creation_time: metadata.created().ok().map(OffsetDateTime::from),
            size_bytes: metadata.len(),
        })
    }

    pub fn content_attributes(&self, path: impl AsRef<Path>) -> Result<ContentAttributes> {
        let path = path.as_ref();
        let checksum = checksum(path)?;
        let mut archive = Archive::open(path).or_raise(|| ErrorKind::Archive(path.to_path_buf()))?;

        let candidates = archive.find(|name| self.metadata_entry.is_match(name));
        let entry = match candidates.as_slice() {
            [entry] => entry.clone(),
            [] => exn::bail!(ErrorKind::MissingEntry(OAI_ORE_NAME)),
            many => exn::bail!(ErrorKind::AmbiguousEntry { entry: OAI_ORE_NAME, count: many.len() }),
        };
        let oai_ore = archive.read_exact(&entry).or_raise(|| ErrorKind::Archive(path.to_path_buf()))?;
        let pid_mapping = match archive.read_entry(PID_MAPPING_ENTRY) {
            Ok(data) => data,
            Err(e) if matches!(e.deref(), ArchiveErrorKind::EntryNotFound(_)) => {
                return Err(e).or_raise(|| ErrorKind::MissingEntry(PID_MAPPING_ENTRY));
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Archive(path.to_path_buf())),
        };

        let document: Value =
            serde_json::from_slice(&oai_ore).or_raise(|| ErrorKind::MalformedDocument(entry.clone()))?;
        let describes = single(&document, &[DESCRIBES]).ok_or_raise(|| ErrorKind::MissingField(DESCRIBES))?;
        let required = |field: &'static str| first(describes, &[field]).ok_or_raise(|| ErrorKind::MissingField(field));
        let optional = |field: &'static str| first(describes, &[field]);

        Ok(ContentAttributes {
            checksum,
            nbn: required(NBN)?,
            bag_id: required(BAG_ID)?,
            dataset_version: required(DATASET_VERSION)?,
            other_id: optional(OTHER_ID),
            other_id_version: optional(OTHER_ID_VERSION),
            sword_client: optional(SWORD_CLIENT),
            sword_token: optional(SWORD_TOKEN),
            oai_ore,
            pid_mapping,
        })
    }
}

/// Lowercase hex SHA-256 of the file's bytes.
fn checksum(path: &Path) -> Result<String> {
    let file = File::open(path).or_raise(|| ErrorKind::Filesystem(path.to_path_buf()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut BufReader::new(file), &mut hasher).or_raise(|| ErrorKind::Filesystem(path.to_path_buf()))?;
    Ok(hex::encode(hasher.finalize()))
}
