use crate::consts::keys::*;
use crate::error::{ErrorKind, Result};
use crate::lookup::{first, single, values};
use crate::models::DatasetMetadata;
use crate::timestamp::TimestampFormat;
use exn::OptionExt;
use serde_json::Value;
use tracing::instrument;

/// Maps an export's JSON-LD document onto a [`DatasetMetadata`] record.
///
/// Pure: no IO, the document has already been parsed.
#[derive(Clone, Debug)]
pub struct Projector {
    timestamps: TimestampFormat,
}
impl Projector {
    pub fn new(timestamps: TimestampFormat) -> Self {
        Self { timestamps }
    }

    #[instrument(level = "debug", skip(self, document))]
    pub fn project(&self, doi: &str, document: &Value) -> Result<DatasetMetadata> {
        let describes = single(document, &[DESCRIBES]).ok_or_raise(|| ErrorKind::MissingField(DESCRIBES))?;

        let published = required(describes, DATE_PUBLISHED)?;
        let modified = required(describes, DATE_MODIFIED)?;
        let modified_at = match self.timestamps.parse(&modified) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(modified = %modified, error = ?e, "Unrecognised modification timestamp");
                None
            },
        };
        let created = first(describes, &[DATE_PRODUCED]).unwrap_or_else(|| published.clone());

        Ok(DatasetMetadata {
            doi: escape(doi),
            nbn: escape(&required(describes, NBN)?),
            title: escape(&required(describes, TITLE)?),
            description: values(describes, &[DESCRIPTION, DESCRIPTION_TEXT])
                .iter()
                .map(|v| escape(v))
                .collect::<Vec<_>>()
                .join("\n\n"),
            creators: non_empty(describes, &[AUTHOR, AUTHOR_NAME], AUTHOR)?,
            created: escape(&created),
            modified: escape(&modified),
            modified_at,
            available: escape(&published),
            published: escape(&published),
            audience_codes: audience_codes(describes).iter().map(|v| escape(v)).collect(),
            access_rights: DatasetMetadata::ACCESS_RIGHTS,
            rights_holders: non_empty(describes, &[RIGHTS_HOLDER], RIGHTS_HOLDER)?,
        })
    }
}

fn required(describes: &Value, field: &'static str) -> Result<String> {
    first(describes, &[field]).ok_or_raise(|| ErrorKind::MissingField(field))
}

/// Escaped values at `path`; at least one must be present.
fn non_empty(describes: &Value, path: &[&str], field: &'static str) -> Result<Vec<String>> {
    let found = values(describes, path);
    if found.is_empty() {
        exn::bail!(ErrorKind::MissingField(field));
    }
    Ok(found.iter().map(|v| escape(v)).collect())
}

/// Audience terms arrive as `{"@id": uri}` objects, as bare URI strings, or
/// as a mix of both, singly or in arrays. Both forms are collected and
/// concatenated; the code is the URI's last non-empty path segment.
fn audience_codes(describes: &Value) -> Vec<String> {
    let objects = values(describes, &[AUDIENCE, ID]);
    let strings = values(describes, &[AUDIENCE]);
    objects
        .iter()
        .chain(strings.iter())
        .map(|uri| uri.trim_end_matches('/'))
        .map(|uri| uri.rsplit_once('/').map_or(uri, |(_, code)| code).to_string())
        .collect()
}

/// Escapes the five XML special characters.
pub(crate) fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;
    use std::ops::Deref;
    use time::macros::datetime;

    #[fixture]
    fn projector() -> Projector {
        Projector::new(TimestampFormat::new().unwrap())
    }

    fn document(overrides: Value) -> Value {
        let mut describes = json!({
            "Title": "Een dataset",
            "citation:Description": { "dsDescription:Text": "Only description" },
            "Author": { "author:Name": "Jane Doe" },
            "schema:datePublished": "2022-03-08",
            "schema:dateModified": "2022-03-08 10:13:17.527",
            "dansRights:Rights Holder": "DANS",
            "dansRelationMetadata:Audience": { "@id": "https://www.narcis.nl/classification/D30100" },
            "dansDataVaultMetadata:NBN": "urn:nbn:nl:ui:13-abc",
        });
        if let (Some(base), Value::Object(extra)) = (describes.as_object_mut(), overrides) {
            for (key, value) in extra {
                if value.is_null() {
                    base.remove(&key);
                } else {
                    base.insert(key, value);
                }
            }
        }
        json!({ "ore:describes": describes })
    }

    #[rstest]
    fn projects_a_complete_document(projector: Projector) {
        let md = projector.project("10.5072/FK2/XCFQ1B", &document(json!({}))).unwrap();
        assert_eq!(md.doi, "10.5072/FK2/XCFQ1B");
        assert_eq!(md.nbn, "urn:nbn:nl:ui:13-abc");
        assert_eq!(md.title, "Een dataset");
        assert_eq!(md.description, "Only description");
        assert_eq!(md.creators, vec!["Jane Doe"]);
        assert_eq!(md.published, "2022-03-08");
        assert_eq!(md.available, "2022-03-08");
        assert_eq!(md.created, "2022-03-08");
        assert_eq!(md.modified_at, Some(datetime!(2022-03-08 10:13:17.527)));
        assert_eq!(md.audience_codes, vec!["D30100"]);
        assert_eq!(md.access_rights, "NO_ACCESS");
        assert_eq!(md.rights_holders, vec!["DANS"]);
    }

    #[rstest]
    #[case::single_string(json!("https://www.narcis.nl/classification/D30100"))]
    #[case::string_list(json!(["https://www.narcis.nl/classification/D30100"]))]
    #[case::single_object(json!({ "@id": "https://www.narcis.nl/classification/D30100" }))]
    #[case::object_list(json!([{ "@id": "https://www.narcis.nl/classification/D30100" }]))]
    #[case::trailing_slash(json!("https://www.narcis.nl/classification/D30100/"))]
    fn audience_representations_normalise_to_the_same_code(projector: Projector, #[case] audience: Value) {
        let doc = document(json!({ "dansRelationMetadata:Audience": audience }));
        let md = projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap();
        assert_eq!(md.audience_codes, vec!["D30100"]);
    }

    #[rstest]
    fn mixed_audience_forms_are_concatenated(projector: Projector) {
        let doc = document(json!({ "dansRelationMetadata:Audience": [
            "https://www.narcis.nl/classification/D42000",
            { "@id": "https://www.narcis.nl/classification/D30100" },
        ]}));
        let md = projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap();
        assert_eq!(md.audience_codes, vec!["D30100", "D42000"]);
    }

    #[rstest]
    fn missing_audience_is_empty(projector: Projector) {
        let doc = document(json!({ "dansRelationMetadata:Audience": null }));
        assert!(projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap().audience_codes.is_empty());
    }

    #[rstest]
    fn multiple_descriptions_are_joined_by_a_blank_line(projector: Projector) {
        let doc = document(json!({ "citation:Description": [
            { "dsDescription:Text": "First" },
            { "dsDescription:Text": "Second" },
        ]}));
        let md = projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap();
        assert_eq!(md.description, "First\n\nSecond");
    }

    #[rstest]
    fn multiple_authors_keep_their_order(projector: Projector) {
        let doc = document(json!({ "Author": [
            { "author:Name": "Zed" },
            { "author:Name": "Alpha" },
        ]}));
        let md = projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap();
        assert_eq!(md.creators, vec!["Zed", "Alpha"]);
    }

    #[rstest]
    fn production_date_overrides_created(projector: Projector) {
        let doc = document(json!({ "citation:Date Produced": "2019-05-01" }));
        let md = projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap();
        assert_eq!(md.created, "2019-05-01");
        assert_eq!(md.available, "2022-03-08");
    }

    #[rstest]
    fn free_text_is_escaped(projector: Projector) {
        let doc = document(json!({
            "Title": "Rock & <Roll>",
            "Author": { "author:Name": "O'Brien" },
            "citation:Description": { "dsDescription:Text": "\"quoted\"" },
        }));
        let md = projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap();
        assert_eq!(md.title, "Rock &amp; &lt;Roll&gt;");
        assert_eq!(md.creators, vec!["O&apos;Brien"]);
        assert_eq!(md.description, "&quot;quoted&quot;");
    }

    #[rstest]
    fn unknown_modification_format_is_not_fatal(projector: Projector) {
        let doc = document(json!({ "schema:dateModified": "last tuesday" }));
        let md = projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap();
        assert_eq!(md.modified, "last tuesday");
        assert_eq!(md.modified_at, None);
    }

    #[rstest]
    #[case(TITLE)]
    #[case(DATE_PUBLISHED)]
    #[case(DATE_MODIFIED)]
    #[case(RIGHTS_HOLDER)]
    #[case(NBN)]
    fn required_fields(projector: Projector, #[case] field: &'static str) {
        let mut removed = serde_json::Map::new();
        removed.insert(field.to_string(), Value::Null);
        let doc = document(Value::Object(removed));
        let err = projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap_err();
        assert_eq!(*err.deref(), ErrorKind::MissingField(field));
    }

    #[rstest]
    fn authors_are_required(projector: Projector) {
        let doc = document(json!({ "Author": [] }));
        let err = projector.project("10.5072/FK2/XCFQ1B", &doc).unwrap_err();
        assert_eq!(*err.deref(), ErrorKind::MissingField(AUTHOR));
    }

    #[rstest]
    fn describes_is_required(projector: Projector) {
        let err = projector.project("10.5072/FK2/XCFQ1B", &json!({ "@context": {} })).unwrap_err();
        assert_eq!(*err.deref(), ErrorKind::MissingField(DESCRIBES));
    }
}
