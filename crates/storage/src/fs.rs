//! Local filesystem primitives.
//!
//! Every export changes hands by being moved, never copied, so these are
//! mostly about moving files reliably: into the work directory, the store,
//! the deposit outbox or quarantine. All IO goes through `tokio::fs`.

use crate::error::{ErrorKind, Result};
use crate::path::validate_filename;
use exn::OptionExt;
use std::path::{Path, PathBuf};
use tokio::fs;

fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
    ErrorKind::from_io(e, path)
}

/// Creates `dir` and any missing parents. Succeeds if it already exists,
/// including when another task creates it concurrently.
pub async fn ensure_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    Ok(fs::create_dir_all(dir).await.map_err(|e| map_io_error(e, dir))?)
}

pub async fn exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    Ok(fs::try_exists(path).await.map_err(|e| map_io_error(e, path))?)
}

pub async fn delete(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    Ok(fs::remove_file(path).await.map_err(|e| map_io_error(e, path))?)
}

/// Deletes `path` if it's there. Returns whether anything was deleted.
pub async fn delete_if_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => exn::bail!(map_io_error(e, path)),
    }
}

/// Moves `from` to `to`, creating `to`'s parent directory if needed. Never
/// replaces an existing `to`: that is [`ErrorKind::AlreadyExists`] and both
/// files are left as they were.
///
/// Within a filesystem the move is a hard link followed by removing `from`,
/// so the existence check and the move are one step. Across filesystems (or
/// where links aren't supported) it falls back to [`move_atomically`].
pub async fn move_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    if let Some(parent) = to.parent() {
        ensure_dir(parent).await?;
    }
    match fs::hard_link(from, to).await {
        Ok(()) => delete(from).await,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()))
        },
        Err(e) if matches!(e.kind(), std::io::ErrorKind::CrossesDevices | std::io::ErrorKind::Unsupported) => {
            tracing::debug!(from = %from.display(), to = %to.display(), "Cannot link; copying instead");
            move_atomically(from, to).await
        },
        Err(e) => exn::bail!(map_io_error(e, from)),
    }
}

/// Moves `from` into the directory `dir`, keeping its filename. Returns the
/// new path. Fails with [`ErrorKind::AlreadyExists`] rather than replace a
/// file of the same name.
pub async fn move_into(from: impl AsRef<Path>, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let from = from.as_ref();
    let name = from.file_name().ok_or_raise(|| ErrorKind::InvalidPath(from.to_path_buf()))?;
    let to = dir.as_ref().join(validate_filename(name)?);
    move_file(from, &to).await?;
    Ok(to)
}

/// Reserves `to` as a new empty file, copies `from` to a `.part` sibling,
/// renames that over the reservation and only then removes `from`.
///
/// The reservation makes an existing `to` an [`ErrorKind::AlreadyExists`].
/// The rename is atomic because the `.part` file lives in the destination
/// directory; a reader of that directory sees either the empty reservation
/// or the complete file.
pub async fn move_atomically(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let (from, to) = (from.as_ref(), to.as_ref());
    let name = to.file_name().ok_or_raise(|| ErrorKind::InvalidPath(to.to_path_buf()))?;
    let mut part_name = name.to_os_string();
    part_name.push(".part");
    let part = to.with_file_name(part_name);

    if !fs::try_exists(from).await.map_err(|e| map_io_error(e, from))? {
        exn::bail!(ErrorKind::NotFound(from.to_path_buf()));
    }
    fs::OpenOptions::new().write(true).create_new(true).open(to).await.map_err(|e| map_io_error(e, to))?;

    if let Err(e) = fs::copy(from, &part).await {
        // Release the reservation and don't leave half a file lying around.
        _ = fs::remove_file(&part).await;
        _ = fs::remove_file(to).await;
        exn::bail!(map_io_error(e, from));
    }
    if let Err(e) = fs::rename(&part, to).await {
        _ = fs::remove_file(&part).await;
        _ = fs::remove_file(to).await;
        exn::bail!(map_io_error(e, to));
    }
    delete(from).await
}

/// Regular files directly inside `dir`, sorted by name. Subdirectories and
/// anything that isn't a regular file are skipped.
pub async fn list_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut entries = fs::read_dir(dir).await.map_err(|e| map_io_error(e, dir))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| map_io_error(e, dir))? {
        let path = entry.path();
        match entry.file_type().await {
            Ok(kind) if kind.is_file() => files.push(path),
            Ok(_) => {},
            // Vanished between listing and stat; someone else's problem now.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => exn::bail!(map_io_error(e, &path)),
        }
    }
    files.sort();
    Ok(files)
}

/// Number of entries (of any kind) directly inside `dir`.
pub async fn count_entries(dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    let mut entries = fs::read_dir(dir).await.map_err(|e| map_io_error(e, dir))?;
    let mut count = 0;
    while entries.next_entry().await.map_err(|e| map_io_error(e, dir))?.is_some() {
        count += 1;
    }
    Ok(count)
}
