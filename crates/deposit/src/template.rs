//! Renders `metadata/dataset.xml` from a projected [`DatasetMetadata`] record.
//!
//! The record's strings arrive XML-escaped, so the template embeds them
//! as-is. Templates are compiled eagerly; a syntax error surfaces when the
//! template is loaded, not when the first deposit is built.

use crate::assets::Builtins;
use crate::error::{Error, ErrorKind, Result};
use easymirror_extract::models::DatasetMetadata;
use exn::ResultExt;
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

pub struct DatasetTemplate {
    name: String,
    engine: Engine<'static>,
    template: Template<'static>,
}
impl FromStr for DatasetTemplate {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::compile("inline", s.to_string())
    }
}
impl DatasetTemplate {
    pub const BUILTIN: &'static str = "dataset.xml";

    /// The template shipped inside the binary.
    pub fn builtin() -> Result<Self> {
        let data = Builtins::load(Self::BUILTIN)?;
        let name = Builtins::identifier(Self::BUILTIN);
        let source = String::from_utf8(data.into_owned()).or_raise(|| ErrorKind::TemplateSyntax(name.clone()))?;
        Self::compile(name, source)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let source = std::fs::read_to_string(path).or_raise(|| ErrorKind::TemplateNotFound(name.clone()))?;
        Self::compile(name, source)
    }

    /// The file at `path` when given, the builtin otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    fn compile(name: impl Into<String>, source: String) -> Result<Self> {
        let name = name.into();
        let engine = Engine::new();
        let template = engine.compile(source).or_raise(|| ErrorKind::TemplateSyntax(name.clone()))?;
        tracing::debug!(template = %name, "Compiled dataset template");
        Ok(Self { name, engine, template })
    }

    #[instrument(level = "debug", skip_all, fields(template = %self.name, doi = %metadata.doi))]
    pub fn render(&self, metadata: &DatasetMetadata) -> Result<String> {
        self.template
            .render(&self.engine, Self::parameters(metadata))
            .to_string()
            .or_raise(|| ErrorKind::Render(self.name.clone()))
    }

    fn parameters(metadata: &DatasetMetadata) -> upon::Value {
        upon::value! {
            metadata: upon::value! {
                doi: metadata.doi.as_str(),
                nbn: metadata.nbn.as_str(),
                title: metadata.title.as_str(),
                description: metadata.description.as_str(),
                creators: metadata.creators.clone(),
                created: metadata.created.as_str(),
                modified: metadata.modified.as_str(),
                published: metadata.published.as_str(),
                available: metadata.available.as_str(),
                audience_codes: metadata.audience_codes.clone(),
                access_rights: metadata.access_rights,
                rights_holders: metadata.rights_holders.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::ops::Deref;

    #[fixture]
    fn metadata() -> DatasetMetadata {
        DatasetMetadata {
            doi: "10.5072/FK2/XCFQ1B".to_string(),
            nbn: "urn:nbn:nl:ui:13-abc".to_string(),
            title: "Rock &amp; Roll".to_string(),
            description: "First\n\nSecond".to_string(),
            creators: vec!["Zed".to_string(), "Alpha".to_string()],
            created: "2019-05-01".to_string(),
            modified: "2022-03-08 10:13:17.527".to_string(),
            modified_at: None,
            published: "2022-03-08".to_string(),
            available: "2022-03-08".to_string(),
            audience_codes: vec!["D30100".to_string()],
            access_rights: DatasetMetadata::ACCESS_RIGHTS,
            rights_holders: vec!["DANS".to_string()],
        }
    }

    #[rstest]
    fn renders_the_builtin_template(metadata: DatasetMetadata) {
        let xml = DatasetTemplate::builtin().unwrap().render(&metadata).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<dc:title>Rock &amp; Roll</dc:title>"));
        assert!(xml.contains("<dcterms:description>First\n\nSecond</dcterms:description>"));
        assert!(xml.find("<dc:creator>Zed</dc:creator>") < xml.find("<dc:creator>Alpha</dc:creator>"));
        assert!(xml.contains("<ddm:audience>D30100</ddm:audience>"));
        assert!(xml.contains("<ddm:accessRights>NO_ACCESS</ddm:accessRights>"));
        assert!(xml.contains(">10.5072/FK2/XCFQ1B</dcterms:identifier>"));
        assert!(xml.contains(">urn:nbn:nl:ui:13-abc</dcterms:identifier>"));
        assert!(xml.contains("<dcterms:rightsHolder>DANS</dcterms:rightsHolder>"));
    }

    #[rstest]
    fn empty_description_is_omitted(mut metadata: DatasetMetadata) {
        metadata.description = String::new();
        let xml = DatasetTemplate::builtin().unwrap().render(&metadata).unwrap();
        assert!(!xml.contains("dcterms:description"));
    }

    #[rstest]
    fn inline_templates(metadata: DatasetMetadata) {
        let template: DatasetTemplate = "{{ metadata.doi }}|{{ metadata.access_rights }}".parse().unwrap();
        assert_eq!(template.render(&metadata).unwrap(), "10.5072/FK2/XCFQ1B|NO_ACCESS");
    }

    #[test]
    fn syntax_errors_surface_on_load() {
        let err = "{{ metadata.title ".parse::<DatasetTemplate>().err().unwrap();
        assert_eq!(*err.deref(), ErrorKind::TemplateSyntax("inline".to_string()));
    }

    #[rstest]
    fn unknown_variables_fail_rendering(metadata: DatasetMetadata) {
        let template: DatasetTemplate = "{{ metadata.nope }}".parse().unwrap();
        let err = template.render(&metadata).unwrap_err();
        assert_eq!(*err.deref(), ErrorKind::Render("inline".to_string()));
    }

    #[rstest]
    fn templates_load_from_files(metadata: DatasetMetadata) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.xml");
        std::fs::write(&path, "<title>{{ metadata.title }}</title>").unwrap();
        let template = DatasetTemplate::load(Some(&path)).unwrap();
        assert_eq!(template.render(&metadata).unwrap(), "<title>Rock &amp; Roll</title>");
    }

    #[test]
    fn missing_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xml");
        let err = DatasetTemplate::from_file(&path).err().unwrap();
        assert_eq!(*err.deref(), ErrorKind::TemplateNotFound(path.display().to_string()));
    }
}
