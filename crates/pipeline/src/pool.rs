use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

/// Runs at most `max_workers` tasks at a time. Submitting never blocks; the
/// rest wait for a permit.
#[derive(Clone, Debug)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
}
impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self { permits: Arc::new(Semaphore::new(max_workers.max(1))), tracker: TaskTracker::new() }
    }

    pub fn submit<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        self.tracker.spawn(async move {
            // Only fails once the semaphore is closed, which it never is.
            let Ok(_permit) = permits.acquire_owned().await else { return };
            task.await;
        });
    }

    /// Tasks submitted but not finished yet, waiting ones included.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Stops accepting work and waits for everything already submitted.
    /// Nothing is cancelled.
    pub async fn drain(&self) {
        self.tracker.close();
        tracing::debug!(pending = self.pending(), "Draining worker pool");
        self.tracker.wait().await;
    }
}
