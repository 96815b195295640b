use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

pub const FILENAME: &str = "deposit.properties";

/// The `deposit.properties` descriptor of a freshly minted deposit.
///
/// Keys keep their insertion order so the written file is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositProperties {
    entries: Vec<(&'static str, String)>,
}
impl DepositProperties {
    pub const DEPOSITOR: &'static str = "easymirror";
    pub const ORIGIN: &'static str = "DataStation";
    pub const BAG_NAME: &'static str = "bag";

    pub fn new(id: Uuid, doi: &str, nbn: &str, created: OffsetDateTime) -> Result<Self> {
        let timestamp = created
            .to_offset(time::UtcOffset::UTC)
            .format(&Rfc3339)
            .or_raise(|| ErrorKind::Render(FILENAME.to_string()))?;
        let entries = vec![
            ("creation.timestamp", timestamp),
            ("state.label", "SUBMITTED".to_string()),
            ("state.description", "Deposit is submitted and ready for processing".to_string()),
            ("depositor.userId", Self::DEPOSITOR.to_string()),
            ("curation.required", "no".to_string()),
            ("curation.performed", "no".to_string()),
            ("identifier.dans-doi.registered", "no".to_string()),
            ("identifier.dans-doi.action", "create".to_string()),
            ("bag-store.bag-name", Self::BAG_NAME.to_string()),
            ("deposit.origin", Self::ORIGIN.to_string()),
            ("identifier.doi", doi.to_string()),
            ("bag-store.bag-id", id.to_string()),
            ("identifier.urn", nbn.to_string()),
        ];
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Writes `deposit.properties` into `dir`.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<()> {
        let path = dir.as_ref().join(FILENAME);
        std::fs::write(&path, self.to_string()).or_raise(|| ErrorKind::Io(path))
    }
}
impl std::fmt::Display for DepositProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{key} = {}", escape(value))?;
        }
        Ok(())
    }
}

/// Java properties escaping for values: backslashes, line breaks and a
/// leading space.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            ' ' if i == 0 => escaped.push_str("\\ "),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use time::macros::datetime;

    #[fixture]
    fn properties() -> DepositProperties {
        let id = Uuid::parse_str("8f3c6a5e-7b1d-4c2a-9e0f-1a2b3c4d5e6f").unwrap();
        DepositProperties::new(id, "10.5072/FK2/XCFQ1B", "urn:nbn:nl:ui:13-abc", datetime!(2024-01-01 11:00 +01:00))
            .unwrap()
    }

    #[rstest]
    fn carries_exactly_the_descriptor_keys(properties: DepositProperties) {
        let keys: Vec<_> = properties.keys().collect();
        assert_eq!(keys, vec![
            "creation.timestamp",
            "state.label",
            "state.description",
            "depositor.userId",
            "curation.required",
            "curation.performed",
            "identifier.dans-doi.registered",
            "identifier.dans-doi.action",
            "bag-store.bag-name",
            "deposit.origin",
            "identifier.doi",
            "bag-store.bag-id",
            "identifier.urn",
        ]);
    }

    #[rstest]
    fn records_identifiers_and_state(properties: DepositProperties) {
        assert_eq!(properties.get("creation.timestamp"), Some("2024-01-01T10:00:00Z"));
        assert_eq!(properties.get("state.label"), Some("SUBMITTED"));
        assert_eq!(properties.get("identifier.doi"), Some("10.5072/FK2/XCFQ1B"));
        assert_eq!(properties.get("bag-store.bag-id"), Some("8f3c6a5e-7b1d-4c2a-9e0f-1a2b3c4d5e6f"));
        assert_eq!(properties.get("identifier.urn"), Some("urn:nbn:nl:ui:13-abc"));
        assert_eq!(properties.get("nope"), None);
    }

    #[rstest]
    fn writes_one_line_per_key(properties: DepositProperties) {
        let dir = tempfile::tempdir().unwrap();
        properties.write(dir.path()).unwrap();
        let written = std::fs::read_to_string(dir.path().join(FILENAME)).unwrap();
        assert_eq!(written.lines().count(), 13);
        assert!(written.contains("deposit.origin = DataStation\n"));
        assert!(written.contains("bag-store.bag-name = bag\n"));
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("a\\b", "a\\\\b")]
    #[case("two\nlines", "two\\nlines")]
    #[case(" leading", "\\ leading")]
    fn escapes_values(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(escape(value), expected);
    }
}
