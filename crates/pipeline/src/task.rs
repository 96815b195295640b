//! Processing of a single export, once it's been moved out of its inbox.
//!
//! ```text
//! read ──▶ migrated? ──▶ duplicate? ──▶ deposit (1.0 only) ──▶ store
//!            │ backlog        │ yes
//!            ▼                ▼
//!          delete           delete
//! ```
//!
//! Anything that fails sends the export to quarantine. The task runs once;
//! its [`Outcome`] is final for that file.

use crate::context::{Context, Inbox};
use crate::error::{Error, ErrorKind, Result};
use derive_more::Display;
use easymirror_deposit::Deposit;
use easymirror_extract::models::{DatasetMetadata, DveMetadata};
use easymirror_storage::fs;
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::{Date, PrimitiveDateTime};
use tracing::instrument;

#[derive(Debug)]
pub enum Outcome {
    /// Mirrored, plus a deposit for first versions.
    Stored { path: PathBuf, deposit: Option<Deposit> },
    /// Deleted on purpose. Not an error.
    Discarded(Discard),
    Failed { quarantined: PathBuf, error: Error },
}

/// Why an export was deleted instead of stored.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    #[display("first version of a migrated dataset")]
    MigrationBacklog,
    #[display("migrated dataset modified at {modified}, before cutoff {cutoff}")]
    PublishedBeforeCutoff { modified: PrimitiveDateTime, cutoff: Date },
    #[display("already in the mirror store")]
    Duplicate,
}

impl Outcome {
    pub fn log(&self, source: &Path) {
        match self {
            Self::Stored { path, deposit: Some(deposit) } => tracing::info!(
                source = %source.display(), stored = %path.display(), deposit = %deposit.id, "Mirrored with deposit"
            ),
            Self::Stored { path, deposit: None } => {
                tracing::info!(source = %source.display(), stored = %path.display(), "Mirrored")
            },
            Self::Discarded(reason) => tracing::warn!(source = %source.display(), %reason, "Discarded"),
            Self::Failed { quarantined, error } => tracing::error!(
                source = %source.display(), quarantined = %quarantined.display(), error = ?error, "Quarantined"
            ),
        }
    }
}

/// Runs one export, already in the work directory, to completion.
///
/// Only returns an error when the export could not be quarantined either;
/// every other failure is an [`Outcome::Failed`].
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn process(ctx: Arc<Context>, inbox: Arc<Inbox>, path: PathBuf) -> Result<Outcome> {
    tracing::info!(inbox = %inbox.path.display(), "Processing export");
    let error = match decide(&ctx, &inbox, &path).await {
        Ok(outcome) => return Ok(outcome),
        Err(error) => error,
    };
    match fs::move_into(&path, &ctx.failed_box).await {
        Ok(quarantined) => Ok(Outcome::Failed { quarantined, error }),
        Err(e) => {
            tracing::error!(error = ?error, "Processing failed");
            Err(e).or_raise(|| ErrorKind::Quarantine(path))
        },
    }
}

async fn decide(ctx: &Arc<Context>, inbox: &Inbox, path: &Path) -> Result<Outcome> {
    let dve = read(ctx, path).await?;
    let version = dve.filename.version;

    if ctx.migrated.is_match(&dve.filename.dataset_pid) {
        if version.is_first() {
            return discard(path, Discard::MigrationBacklog).await;
        }
        let metadata = project(ctx, &dve)?;
        let modified = metadata.modified_at.ok_or_raise(|| ErrorKind::UnknownModified(metadata.modified.clone()))?;
        let cutoff = inbox.cutoff;
        if modified < cutoff.midnight() {
            return discard(path, Discard::PublishedBeforeCutoff { modified, cutoff }).await;
        }
    }

    // Checked before anything is built, so a duplicate leaves no trace.
    let filename = path.file_name().ok_or_raise(|| ErrorKind::Store)?;
    if ctx.store.contains(filename).await.or_raise(|| ErrorKind::Store)? {
        return discard(path, Discard::Duplicate).await;
    }

    let deposit = if version.is_first() {
        let metadata = project(ctx, &dve)?;
        Some(deposit(ctx, dve, metadata).await?)
    } else {
        None
    };

    let stored = ctx.store.store(path).await.or_raise(|| ErrorKind::Store)?;
    Ok(Outcome::Stored { path: stored, deposit })
}

async fn read(ctx: &Arc<Context>, path: &Path) -> Result<DveMetadata> {
    let (ctx, owned) = (Arc::clone(ctx), path.to_path_buf());
    tokio::task::spawn_blocking(move || ctx.reader.read(owned))
        .await
        .or_raise(|| ErrorKind::Worker)?
        .or_raise(|| ErrorKind::Read)
}

fn project(ctx: &Context, dve: &DveMetadata) -> Result<DatasetMetadata> {
    let document = dve.content.document().or_raise(|| ErrorKind::Project)?;
    ctx.projector.project(&dve.filename.dataset_pid, &document).or_raise(|| ErrorKind::Project)
}

async fn deposit(ctx: &Arc<Context>, dve: DveMetadata, metadata: DatasetMetadata) -> Result<Deposit> {
    let ctx = Arc::clone(ctx);
    tokio::task::spawn_blocking(move || ctx.deposits.build(&dve, &metadata))
        .await
        .or_raise(|| ErrorKind::Worker)?
        .or_raise(|| ErrorKind::Deposit)
}

async fn discard(path: &Path, reason: Discard) -> Result<Outcome> {
    fs::delete(path).await.or_raise(|| ErrorKind::Discard)?;
    Ok(Outcome::Discarded(reason))
}
