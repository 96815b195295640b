use crate::error::{ErrorKind, Result};
use easymirror_config::Config;
use easymirror_deposit::{DatasetTemplate, DepositBuilder};
use easymirror_extract::{Classifier, Projector, Reader, TimestampFormat};
use easymirror_storage::MirrorStore;
use exn::ResultExt;
use regex::Regex;
use std::path::PathBuf;
use time::Date;

/// Everything a processing task needs, built once at start-up and shared
/// read-only between workers.
pub struct Context {
    pub reader: Reader,
    pub projector: Projector,
    /// Dataset PIDs of datasets migrated in from elsewhere.
    pub migrated: Regex,
    pub store: MirrorStore,
    pub deposits: DepositBuilder,
    pub work_dir: PathBuf,
    pub failed_box: PathBuf,
}
impl Context {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mirroring = &config.mirroring;
        let reader = Classifier::new().and_then(Reader::new).or_raise(|| ErrorKind::Setup)?;
        let projector = Projector::new(TimestampFormat::new().or_raise(|| ErrorKind::Setup)?);
        let template = DatasetTemplate::load(mirroring.dataset_template.as_deref()).or_raise(|| ErrorKind::Setup)?;
        let algorithms = config.checksum_algorithms().or_raise(|| ErrorKind::Setup)?;
        Ok(Self {
            reader,
            projector,
            migrated: config.migrated_pattern().or_raise(|| ErrorKind::Setup)?,
            store: MirrorStore::new(&mirroring.mirror_store).or_raise(|| ErrorKind::Setup)?,
            deposits: DepositBuilder::new(&mirroring.work_dir, &mirroring.deposit_outbox, template)
                .with_algorithms(algorithms),
            work_dir: mirroring.work_dir.clone(),
            failed_box: mirroring.failed_box.clone(),
        })
    }

    pub fn classifier(&self) -> &Classifier {
        self.reader.classifier()
    }
}

/// A watched inbox and the cutoff date for updates to migrated datasets
/// arriving through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbox {
    pub path: PathBuf,
    pub cutoff: Date,
}
impl Inbox {
    pub fn from_config(config: &Config) -> Vec<Self> {
        (config.mirroring.inboxes.iter())
            .map(|inbox| Self { path: inbox.path.clone(), cutoff: inbox.cutoff })
            .collect()
    }
}
