use crate::context::{Context, Inbox};
use crate::error::{ErrorKind, Result};
use crate::pool::WorkerPool;
use crate::task::process;
use crate::watch::{InboxListener, WatchState};
use async_trait::async_trait;
use easymirror_storage::fs;
use exn::ResultExt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

/// Takes exports out of their inbox and hands them to the worker pool.
#[derive(Clone)]
pub struct Dispatcher {
    ctx: Arc<Context>,
    pool: WorkerPool,
}
impl Dispatcher {
    pub fn new(ctx: Arc<Context>, pool: WorkerPool) -> Self {
        Self { ctx, pool }
    }

    /// Moves `path` into the work directory, which makes it this dispatch's
    /// alone, removes its sidecar and submits a processing task.
    #[instrument(skip_all, fields(path = %path.display(), ?state))]
    pub async fn dispatch(&self, inbox: &Arc<Inbox>, path: PathBuf, state: WatchState) -> Result<()> {
        let attributes = (self.ctx.classifier().classify_path(&path)).or_raise(|| ErrorKind::Dispatch(path.clone()))?;
        let owned = (fs::move_into(&path, &self.ctx.work_dir).await).or_raise(|| ErrorKind::Dispatch(path.clone()))?;

        let sidecar = path.with_file_name(attributes.sidecar_name());
        match fs::delete_if_exists(&sidecar).await {
            Ok(true) => tracing::debug!(sidecar = %sidecar.display(), "Deleted sidecar"),
            Ok(false) => tracing::warn!(sidecar = %sidecar.display(), "No sidecar found"),
            Err(e) => tracing::warn!(sidecar = %sidecar.display(), error = ?e, "Could not delete sidecar"),
        }

        let (ctx, inbox) = (Arc::clone(&self.ctx), Arc::clone(inbox));
        self.pool.submit(async move {
            let source = owned.clone();
            match process(ctx, inbox, owned).await {
                Ok(outcome) => outcome.log(&source),
                Err(e) => {
                    tracing::error!(path = %source.display(), error = ?e, "Export is stuck in the work directory")
                },
            }
        });
        tracing::debug!(pending = self.pool.pending(), "Dispatched");
        Ok(())
    }
}

#[async_trait]
impl InboxListener for Dispatcher {
    async fn on_startup(&self, inbox: &Arc<Inbox>, existing: Vec<PathBuf>) -> Result<()> {
        for path in existing {
            if let Err(e) = self.dispatch(inbox, path.clone(), WatchState::Sweeping).await {
                tracing::error!(path = %path.display(), error = ?e, "Could not dispatch export");
            }
        }
        Ok(())
    }

    async fn on_create(&self, inbox: &Arc<Inbox>, path: PathBuf) -> Result<()> {
        self.dispatch(inbox, path, WatchState::Live).await
    }
}
