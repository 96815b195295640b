mod content;
mod dataset;
mod filename;
mod filesystem;

pub use self::content::ContentAttributes;
pub use self::dataset::DatasetMetadata;
pub use self::filename::{DatasetVersion, Extension, FilenameAttributes};
pub use self::filesystem::FilesystemAttributes;

/// Everything the pipeline knows about a single export before acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DveMetadata {
    pub filename: FilenameAttributes,
    pub filesystem: FilesystemAttributes,
    pub content: ContentAttributes,
}
