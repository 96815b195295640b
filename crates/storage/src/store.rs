//! The mirror store: every processed export, sharded two levels deep.

use crate::error::{ErrorKind, Result};
use crate::fs;
use crate::path::validate_filename;
use exn::OptionExt;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Content store for mirrored exports, laid out as `<root>/<top>/<bottom>/<filename>`.
///
/// `top` and `bottom` are the first two pairs of characters following the
/// last `-` in the filename, so `doi-10-5072-fk2-xcfq1bv1.0.zip` lives in
/// `xc/fq/`. The store never overwrites: callers check [`contains`](Self::contains)
/// first and decide what a duplicate means.
#[derive(Clone, Debug)]
pub struct MirrorStore {
    root: PathBuf,
}
impl MirrorStore {
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shard directory for `filename`.
    pub fn shard(&self, filename: impl AsRef<Path>) -> Result<PathBuf> {
        let name = validate_filename(filename.as_ref())?;
        let invalid = || ErrorKind::InvalidPath(PathBuf::from(name));
        // `rsplit` always yields at least one item.
        let segment = name.rsplit('-').next().unwrap_or(name);
        let top = segment.get(0..2).ok_or_raise(invalid)?;
        let bottom = segment.get(2..4).ok_or_raise(invalid)?;
        if !top.chars().chain(bottom.chars()).all(|c| c.is_ascii_alphanumeric()) {
            exn::bail!(invalid());
        }
        Ok(self.root.join(top).join(bottom))
    }

    /// Where `filename` is (or would be) stored.
    pub fn location(&self, filename: impl AsRef<Path>) -> Result<PathBuf> {
        let filename = filename.as_ref();
        Ok(self.shard(filename)?.join(filename))
    }

    pub async fn contains(&self, filename: impl AsRef<Path>) -> Result<bool> {
        fs::exists(self.location(filename)?).await
    }

    /// Moves the file at `source` into its shard, creating the shard if
    /// necessary. Returns the stored location.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::AlreadyExists`] if a file of the same name is already
    /// stored; it is left untouched.
    #[instrument(skip_all, fields(source = %source.as_ref().display()))]
    pub async fn store(&self, source: impl AsRef<Path>) -> Result<PathBuf> {
        let source = source.as_ref();
        let filename = source.file_name().ok_or_raise(|| ErrorKind::InvalidPath(source.to_path_buf()))?;
        let target = self.location(filename)?;
        if fs::exists(&target).await? {
            exn::bail!(ErrorKind::AlreadyExists(target));
        }
        fs::move_file(source, &target).await?;
        tracing::debug!(target = %target.display(), "Stored in mirror store");
        Ok(target)
    }
}
