//! Directory layout shared by the pipeline's tests.

use crate::context::{Context, Inbox};
use easymirror_deposit::{DatasetTemplate, DepositBuilder};
use easymirror_extract::mock::MockDve;
use easymirror_extract::{Classifier, Projector, Reader, TimestampFormat};
use easymirror_storage::MirrorStore;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use time::macros::date;

/// Inbox, work, outbox, failed and store directories in a fresh tempdir.
pub struct Layout {
    _root: TempDir,
    pub inbox: PathBuf,
    pub work: PathBuf,
    pub outbox: PathBuf,
    pub failed: PathBuf,
    pub store: PathBuf,
}
impl Layout {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let dir = |name: &str| {
            let path = root.path().join(name);
            std::fs::create_dir(&path).unwrap();
            path
        };
        let (inbox, work, outbox) = (dir("inbox"), dir("work"), dir("outbox"));
        let (failed, store) = (dir("failed"), dir("store"));
        Self { _root: root, inbox, work, outbox, failed, store }
    }

    pub fn context(&self) -> Arc<Context> {
        self.context_with(DatasetTemplate::builtin().unwrap())
    }

    pub fn context_with(&self, template: DatasetTemplate) -> Arc<Context> {
        Arc::new(Context {
            reader: Reader::new(Classifier::new().unwrap()).unwrap(),
            projector: Projector::new(TimestampFormat::new().unwrap()),
            migrated: Regex::new(r"^10\.17026/DANS.*$").unwrap(),
            store: MirrorStore::new(&self.store).unwrap(),
            deposits: DepositBuilder::new(&self.work, &self.outbox, template),
            work_dir: self.work.clone(),
            failed_box: self.failed.clone(),
        })
    }

    pub fn inbox(&self) -> Arc<Inbox> {
        Arc::new(Inbox { path: self.inbox.clone(), cutoff: date!(2022 - 01 - 01) })
    }

    /// Writes `dve` into the work directory, as if just dispatched.
    pub fn dispatched(&self, name: &str, dve: MockDve) -> PathBuf {
        let path = self.work.join(name);
        dve.write(&path).unwrap();
        path
    }

    pub fn count(dir: &Path) -> usize {
        let mut count = 0;
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            count += if path.is_dir() { Self::count(&path) } else { 1 };
        }
        count
    }

    pub fn deposits(&self) -> usize {
        std::fs::read_dir(&self.outbox).unwrap().count()
    }

    pub fn stored(&self) -> usize {
        Self::count(&self.store)
    }

    pub fn quarantined(&self) -> usize {
        Self::count(&self.failed)
    }
}

