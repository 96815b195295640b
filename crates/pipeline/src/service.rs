use crate::context::{Context, Inbox};
use crate::dispatch::Dispatcher;
use crate::error::{ErrorKind, Result};
use crate::pool::WorkerPool;
use crate::watch::Poller;
use easymirror_config::Config;
use easymirror_storage::fs;
use exn::ResultExt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Watches every configured inbox and processes what arrives, until stopped.
pub struct MirroringService {
    ctx: Arc<Context>,
    inboxes: Vec<Inbox>,
    interval: Duration,
    pool: WorkerPool,
    stop: CancellationToken,
}
impl MirroringService {
    pub fn new(ctx: Arc<Context>, inboxes: Vec<Inbox>, interval: Duration, max_workers: usize) -> Self {
        Self { ctx, inboxes, interval, pool: WorkerPool::new(max_workers), stop: CancellationToken::new() }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let ctx = Arc::new(Context::from_config(config)?);
        Ok(Self::new(ctx, Inbox::from_config(config), config.polling_interval(), config.task_queue.max_workers))
    }

    /// A handle that stops [`run`](Self::run) when cancelled.
    pub fn stopper(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Polls until stopped, then waits for every dispatched export to finish.
    ///
    /// # Errors
    ///
    /// An inbox that can't be listed ends the run; exports already dispatched
    /// are still finished first.
    pub async fn run(&self) -> Result<()> {
        let ctx = &self.ctx;
        for dir in [ctx.work_dir.as_path(), ctx.failed_box.as_path(), ctx.deposits.outbox(), ctx.store.root()] {
            fs::ensure_dir(dir).await.or_raise(|| ErrorKind::Setup)?;
        }
        tracing::info!(
            inboxes = self.inboxes.len(),
            interval = ?self.interval,
            "Mirroring service started"
        );

        let dispatcher = Dispatcher::new(Arc::clone(&self.ctx), self.pool.clone());
        let poller = Poller::new(self.ctx.classifier().clone(), self.inboxes.iter().cloned(), dispatcher);
        let result = poller.run(self.interval, self.stop.clone()).await;
        if let Err(e) = &result {
            tracing::error!(error = ?e, "Polling failed; finishing dispatched exports");
            self.stop.cancel();
        }

        self.pool.drain().await;
        tracing::info!("Mirroring service stopped");
        result
    }
}
