use time::PrimitiveDateTime;

/// Template-ready description of a dataset version.
///
/// Every string in here has already been XML-escaped; the `dataset.xml`
/// template embeds them as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetMetadata {
    pub doi: String,
    pub nbn: String,
    pub title: String,
    /// Description fragments joined by a blank line.
    pub description: String,
    pub creators: Vec<String>,
    pub created: String,
    pub modified: String,
    /// `modified`, parsed. `None` when the exporter used a format we don't know.
    pub modified_at: Option<PrimitiveDateTime>,
    pub published: String,
    pub available: String,
    pub audience_codes: Vec<String>,
    pub access_rights: &'static str,
    pub rights_holders: Vec<String>,
}
impl DatasetMetadata {
    /// Mirrored datasets must render as inaccessible.
    pub const ACCESS_RIGHTS: &'static str = "NO_ACCESS";
}
