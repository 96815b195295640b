//! Builds Dataset Version Exports on disk for tests.

use easymirror_archive::mock::{MockArchive, ZipResult};
use serde_json::{Map, Value, json};
use std::path::Path;

/// A minimal, valid export: a zipped bag with an `oai-ore.jsonld` and a
/// `pid-mapping.txt`. Individual fields and entries can be changed or left
/// out to produce broken ones.
#[derive(Clone, Debug)]
pub struct MockDve {
    describes: Map<String, Value>,
    metadata: Metadata,
    pid_mapping: bool,
}

#[derive(Clone, Debug)]
enum Metadata {
    Document,
    Duplicated,
    Raw(String),
    Missing,
}

impl Default for MockDve {
    fn default() -> Self {
        Self::new()
    }
}
impl MockDve {
    pub const NBN: &'static str = "urn:nbn:nl:ui:13-c7c5-a4";
    pub const BAG_ID: &'static str = "urn:uuid:0b9bb5ee-3187-4387-bb39-2c09536c79f7";
    pub const MODIFIED: &'static str = "2022-03-08 10:13:17.527";

    pub fn new() -> Self {
        let describes = json!({
            "@id": "https://doi.org/10.5072/FK2/XCFQ1B",
            "Title": "A mirrored dataset",
            "citation:Description": { "dsDescription:Text": "What the dataset is about" },
            "Author": { "author:Name": "Jane Doe" },
            "schema:datePublished": "2022-03-08",
            "schema:dateModified": Self::MODIFIED,
            "dansRights:Rights Holder": "DANS",
            "dansRelationMetadata:Audience": { "@id": "https://www.narcis.nl/classification/D30100" },
            "dansDataVaultMetadata:NBN": Self::NBN,
            "dansDataVaultMetadata:Bag ID": Self::BAG_ID,
            "dansDataVaultMetadata:DV PID Version": "1.0",
        });
        Self {
            describes: describes.as_object().cloned().unwrap_or_default(),
            metadata: Metadata::Document,
            pid_mapping: true,
        }
    }

    /// Sets (or replaces) a key of the `ore:describes` node.
    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.describes.insert(key.into(), value);
        self
    }

    /// Removes a key from the `ore:describes` node.
    pub fn remove(mut self, key: &str) -> Self {
        self.describes.remove(key);
        self
    }

    pub fn modified(self, timestamp: &str) -> Self {
        self.set("schema:dateModified", json!(timestamp))
    }

    pub fn without_metadata(mut self) -> Self {
        self.metadata = Metadata::Missing;
        self
    }

    pub fn with_duplicate_metadata(mut self) -> Self {
        self.metadata = Metadata::Duplicated;
        self
    }

    pub fn with_raw_metadata(mut self, raw: impl Into<String>) -> Self {
        self.metadata = Metadata::Raw(raw.into());
        self
    }

    pub fn without_pid_mapping(mut self) -> Self {
        self.pid_mapping = false;
        self
    }

    /// The JSON-LD document as it will be written into the archive.
    pub fn document(&self) -> Value {
        json!({
            "@context": { "ore": "http://www.openarchives.org/ore/terms/" },
            "ore:describes": Value::Object(self.describes.clone()),
        })
    }

    /// Writes the export to `path`; the bag directory is named after the file.
    pub fn write(&self, path: impl AsRef<Path>) -> ZipResult<()> {
        let path = path.as_ref();
        let bag = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "bag".to_string());
        let mut archive = MockArchive::new()
            .with_entry(format!("{bag}/bagit.txt"), "BagIt-Version: 1.0\nTag-File-Character-Encoding: UTF-8\n")
            .with_entry(format!("{bag}/data/README.txt"), "payload");
        let document = self.document().to_string();
        archive = match &self.metadata {
            Metadata::Document => archive.with_entry(format!("{bag}/metadata/oai-ore.jsonld"), &document),
            Metadata::Duplicated => archive
                .with_entry(format!("{bag}/metadata/oai-ore.jsonld"), &document)
                .with_entry(format!("{bag}-copy/metadata/oai-ore.jsonld"), &document),
            Metadata::Raw(raw) => archive.with_entry(format!("{bag}/metadata/oai-ore.jsonld"), raw),
            Metadata::Missing => archive,
        };
        if self.pid_mapping {
            archive = archive.with_entry(format!("{bag}/metadata/pid-mapping.txt"), "doi:10.5072/FK2/XCFQ1B data/\n");
        }
        archive.write(path)
    }
}
