use crate::error::{ErrorKind, Result};
use easymirror_storage::fs;
use exn::ResultExt;
use std::path::{Path, PathBuf};

/// How full an inbox is. A non-empty inbox that stays non-empty means
/// exports aren't being picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxStatus {
    pub path: PathBuf,
    pub entries: usize,
}
impl InboxStatus {
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}

pub async fn inbox_status(path: impl AsRef<Path>) -> Result<InboxStatus> {
    let path = path.as_ref().to_path_buf();
    let entries = fs::count_entries(&path).await.or_raise(|| ErrorKind::Inbox(path.clone()))?;
    Ok(InboxStatus { path, entries })
}
