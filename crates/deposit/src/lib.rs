//! Builds the metadata-only deposits that announce a dataset's first version
//! to downstream ingest.
//!
//! A deposit is assembled in its own directory under the work area and only
//! moved into the outbox, with a single rename, once it's complete:
//!
//! ```text
//! <uuid>/
//! ├── deposit.properties
//! └── bag/
//!     ├── bagit.txt, bag-info.txt, manifest-*.txt, tagmanifest-*.txt
//!     ├── data/
//!     └── metadata/
//!         ├── dataset.xml
//!         └── files.xml
//! ```

mod assets;
mod bag;
pub mod error;
mod properties;
mod template;

pub use crate::bag::{Bag, ChecksumAlgorithm};
use crate::error::{ErrorKind, Result};
pub use crate::properties::DepositProperties;
pub use crate::template::DatasetTemplate;
use easymirror_extract::models::{DatasetMetadata, DveMetadata};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::instrument;
use uuid::Uuid;

pub const FILES_XML: &str = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<files />";

/// A deposit that made it into the outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub id: Uuid,
    pub path: PathBuf,
}

pub struct DepositBuilder {
    work_dir: PathBuf,
    outbox: PathBuf,
    template: DatasetTemplate,
    algorithms: Vec<ChecksumAlgorithm>,
}
impl DepositBuilder {
    /// `work_dir` and `outbox` must be on the same filesystem; publishing is a
    /// plain rename.
    pub fn new(work_dir: impl Into<PathBuf>, outbox: impl Into<PathBuf>, template: DatasetTemplate) -> Self {
        Self {
            work_dir: work_dir.into(),
            outbox: outbox.into(),
            template,
            algorithms: vec![ChecksumAlgorithm::Sha256],
        }
    }

    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = ChecksumAlgorithm>) -> Self {
        self.algorithms = algorithms.into_iter().collect();
        if self.algorithms.is_empty() {
            self.algorithms.push(ChecksumAlgorithm::Sha256);
        }
        self
    }

    pub fn outbox(&self) -> &Path {
        &self.outbox
    }

    /// Mints a deposit for `dve` and publishes it into the outbox.
    ///
    /// Blocking. On failure nothing is published and the half-built
    /// directory is removed from the work area.
    #[instrument(skip_all, fields(doi = %dve.filename.dataset_pid))]
    pub fn build(&self, dve: &DveMetadata, metadata: &DatasetMetadata) -> Result<Deposit> {
        let id = Uuid::new_v4();
        let staging = self.work_dir.join(id.to_string());
        std::fs::create_dir(&staging).or_raise(|| ErrorKind::Io(staging.clone()))?;
        tracing::debug!(deposit = %id, path = %staging.display(), "Minted deposit");

        let target = self.outbox.join(id.to_string());
        let published = self
            .populate(&staging, id, dve, metadata)
            .and_then(|()| std::fs::rename(&staging, &target).or_raise(|| ErrorKind::Publish(target.clone())));
        if let Err(e) = published {
            if let Err(cleanup) = std::fs::remove_dir_all(&staging) {
                tracing::warn!(path = %staging.display(), error = %cleanup, "Could not remove unfinished deposit");
            }
            return Err(e);
        }
        tracing::info!(deposit = %id, path = %target.display(), "Deposit published");
        Ok(Deposit { id, path: target })
    }

    fn populate(&self, staging: &Path, id: Uuid, dve: &DveMetadata, metadata: &DatasetMetadata) -> Result<()> {
        DepositProperties::new(id, &dve.filename.dataset_pid, &dve.content.nbn, OffsetDateTime::now_utc())?
            .write(staging)?;

        let mut bag = Bag::create(staging.join(DepositProperties::BAG_NAME), &self.algorithms)?;
        if let Some(created) = dve.filesystem.creation_time {
            let created = created.format(&Rfc3339).or_raise(|| ErrorKind::Render("bag-info.txt".to_string()))?;
            bag.add_info("Created", created);
        }

        let dir = bag.dir().join("metadata");
        std::fs::create_dir(&dir).or_raise(|| ErrorKind::Io(dir.clone()))?;
        let dataset = dir.join("dataset.xml");
        std::fs::write(&dataset, self.template.render(metadata)?).or_raise(|| ErrorKind::Io(dataset))?;
        let files = dir.join("files.xml");
        std::fs::write(&files, FILES_XML).or_raise(|| ErrorKind::Io(files))?;

        bag.write()
    }
}
