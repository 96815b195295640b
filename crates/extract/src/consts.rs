//! Patterns and JSON-LD keys describing a Dataset Version Export.
//!
//! Patterns are plain strings here; they're compiled once by the component
//! that owns them ([`Classifier`](crate::Classifier), [`Reader`](crate::Reader))
//! and shared by reference from then on.

/// Full-match grammar for DVE filenames, e.g. `doi-10-5072-fk2-xcfq1bv1.0.zip` or
/// the sidecar `doi-10-5072-fk2-xcfq1b-datacite.v1.0.xml`.
pub(crate) const DVE_FILENAME: &str = concat!(
    r"^(?<doi>doi-10-[0-9]{4,}-[A-Za-z0-9]{2,}-[A-Za-z0-9]{6})",
    r"-?(?<schema>datacite)?\.?",
    r"v(?<major>[0-9]+)\.(?<minor>[0-9]+)",
    r"\.(?<extension>zip|xml)$",
);

/// The JSON-LD metadata document sits one directory deep: `<bag>/metadata/oai-ore.jsonld`.
pub(crate) const OAI_ORE_ENTRY: &str = r"^[^/]+/metadata/oai-ore\.jsonld$";
pub(crate) const OAI_ORE_NAME: &str = "metadata/oai-ore.jsonld";
pub(crate) const PID_MAPPING_ENTRY: &str = "metadata/pid-mapping.txt";

/// Dataverse's export format for `schema:dateModified`.
pub(crate) const DATAVERSE_TIMESTAMP: &str = "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]";
pub(crate) const ISO_DATE: &str = "[year]-[month]-[day]";

pub(crate) mod keys {
    pub(crate) const DESCRIBES: &str = "ore:describes";

    pub(crate) const NBN: &str = "dansDataVaultMetadata:NBN";
    pub(crate) const DATASET_VERSION: &str = "dansDataVaultMetadata:DV PID Version";
    pub(crate) const BAG_ID: &str = "dansDataVaultMetadata:Bag ID";
    pub(crate) const OTHER_ID: &str = "dansDataVaultMetadata:Other ID";
    pub(crate) const OTHER_ID_VERSION: &str = "dansDataVaultMetadata:Other ID Version";
    pub(crate) const SWORD_CLIENT: &str = "dansDataVaultMetadata:SWORD Client";
    pub(crate) const SWORD_TOKEN: &str = "dansDataVaultMetadata:SWORD Token";

    pub(crate) const TITLE: &str = "Title";
    pub(crate) const DESCRIPTION: &str = "citation:Description";
    pub(crate) const DESCRIPTION_TEXT: &str = "dsDescription:Text";
    pub(crate) const AUTHOR: &str = "Author";
    pub(crate) const AUTHOR_NAME: &str = "author:Name";
    pub(crate) const DATE_PUBLISHED: &str = "schema:datePublished";
    pub(crate) const DATE_MODIFIED: &str = "schema:dateModified";
    pub(crate) const DATE_PRODUCED: &str = "citation:Date Produced";
    pub(crate) const AUDIENCE: &str = "dansRelationMetadata:Audience";
    pub(crate) const ID: &str = "@id";
    pub(crate) const RIGHTS_HOLDER: &str = "dansRights:Rights Holder";
}
