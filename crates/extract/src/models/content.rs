use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::Value;

/// Attributes read from inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentAttributes {
    /// Lowercase hex SHA-256 of the whole archive.
    pub checksum: String,
    pub nbn: String,
    pub bag_id: String,
    pub dataset_version: String,
    pub other_id: Option<String>,
    pub other_id_version: Option<String>,
    pub sword_client: Option<String>,
    pub sword_token: Option<String>,
    /// Raw `metadata/oai-ore.jsonld`.
    pub oai_ore: Vec<u8>,
    /// Raw `metadata/pid-mapping.txt`.
    pub pid_mapping: Vec<u8>,
}
impl ContentAttributes {
    /// Parses the embedded JSON-LD document.
    pub fn document(&self) -> Result<Value> {
        serde_json::from_slice(&self.oai_ore)
            .or_raise(|| ErrorKind::MalformedDocument(crate::consts::OAI_ORE_NAME.to_string()))
    }
}
