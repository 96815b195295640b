use std::fmt::{Display, Formatter, Result as FmtResult};

/// `vMAJOR.MINOR` of a dataset version, as encoded in the export's filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetVersion {
    pub major: u32,
    pub minor: u32,
}
impl DatasetVersion {
    pub const FIRST: Self = Self::new(1, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Only the very first published version of a dataset gets a deposit.
    pub fn is_first(&self) -> bool {
        *self == Self::FIRST
    }
}
impl Display for DatasetVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    Zip,
    Xml,
}

/// Identifiers derived purely from an export's filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameAttributes {
    /// Canonical DOI, e.g. `10.5072/FK2/XCFQ1B`.
    pub dataset_pid: String,
    pub version: DatasetVersion,
    /// The DOI token exactly as it appears in the filename, e.g. `doi-10-5072-fk2-xcfq1b`.
    pub identifier: String,
    pub schema: Option<String>,
    pub extension: Extension,
}
impl FilenameAttributes {
    /// Name of the DataCite descriptor that accompanies the export in its inbox.
    pub fn sidecar_name(&self) -> String {
        format!("{}-datacite.v{}.xml", self.identifier, self.version)
    }
}
