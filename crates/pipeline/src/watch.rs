//! Polling inboxes for new exports.
//!
//! Every inbox starts out [`Sweeping`](WatchState::Sweeping): the first poll
//! hands everything already there to [`InboxListener::on_startup`] and moves
//! the inbox to [`Live`](WatchState::Live). From then on, a poll diffs the
//! listing against the previous one and reports each new file to
//! [`InboxListener::on_create`]. A file is reported by exactly one of the two.

use crate::context::Inbox;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use easymirror_extract::Classifier;
use easymirror_storage::fs;
use exn::ResultExt;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Handling whatever was in the inbox at start-up.
    Sweeping,
    /// Handling files as they appear.
    Live,
}

#[async_trait]
pub trait InboxListener: Send + Sync {
    /// Exports already present in `inbox` when watching began.
    async fn on_startup(&self, inbox: &Arc<Inbox>, existing: Vec<PathBuf>) -> Result<()>;
    /// An export that appeared in `inbox` since the previous poll.
    async fn on_create(&self, inbox: &Arc<Inbox>, path: PathBuf) -> Result<()>;
}

struct Watch {
    inbox: Arc<Inbox>,
    state: WatchState,
    seen: HashSet<PathBuf>,
}

pub struct Poller<L> {
    classifier: Classifier,
    watches: Vec<Watch>,
    listener: L,
}
impl<L: InboxListener> Poller<L> {
    pub fn new(classifier: Classifier, inboxes: impl IntoIterator<Item = Inbox>, listener: L) -> Self {
        let watches = (inboxes.into_iter())
            .map(|inbox| Watch { inbox: Arc::new(inbox), state: WatchState::Sweeping, seen: HashSet::new() })
            .collect();
        Self { classifier, watches, listener }
    }

    #[cfg(test)]
    fn state(&self, inbox: &Inbox) -> Option<WatchState> {
        self.watches.iter().find(|w| *w.inbox == *inbox).map(|w| w.state)
    }

    /// One pass over every inbox.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Inbox`] if an inbox can't be listed. Failures handling
    /// individual files are logged and don't stop the pass; a live file whose
    /// failure is retryable is reported again on the next poll.
    pub async fn poll(&mut self) -> Result<()> {
        for watch in &mut self.watches {
            let path = &watch.inbox.path;
            let listing: Vec<PathBuf> = (fs::list_files(path).await.or_raise(|| ErrorKind::Inbox(path.clone()))?)
                .into_iter()
                .filter(|file| self.classifier.is_dve(file))
                .collect();
            let mut retry = Vec::new();

            match watch.state {
                WatchState::Sweeping => {
                    tracing::info!(inbox = %path.display(), existing = listing.len(), "Sweeping inbox");
                    if let Err(e) = self.listener.on_startup(&watch.inbox, listing.clone()).await {
                        tracing::error!(inbox = %path.display(), error = ?e, "Start-up sweep failed");
                    }
                    watch.state = WatchState::Live;
                },
                WatchState::Live => {
                    for file in listing.iter().filter(|file| !watch.seen.contains(*file)) {
                        match self.listener.on_create(&watch.inbox, file.clone()).await {
                            Ok(()) => {},
                            Err(e) if e.is_retryable() => {
                                tracing::warn!(path = %file.display(), error = ?e, "Could not dispatch export yet");
                                retry.push(file.clone());
                            },
                            Err(e) => tracing::error!(path = %file.display(), error = ?e, "Could not dispatch export"),
                        }
                    }
                },
            }
            // Only what's still there; dispatched files have left the inbox.
            watch.seen = listing.into_iter().filter(|file| !retry.contains(file)).collect();
        }
        Ok(())
    }

    /// Polls every `interval` until `stop` is cancelled or an inbox can't be
    /// listed.
    pub async fn run(mut self, interval: Duration, stop: CancellationToken) -> Result<()> {
        while !stop.is_cancelled() {
            self.poll().await?;
            tokio::select! {
                () = stop.cancelled() => break,
                () = tokio::time::sleep(interval) => {},
            }
        }
        tracing::info!("Stopped polling");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Layout;
    use rstest::*;
    use std::ops::Deref;
    use std::sync::Mutex;

    /// Remembers what it was told, and leaves files where they are. Refuses
    /// live files while `refusing` holds an error for them.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(WatchState, PathBuf)>>,
        refusing: Mutex<Option<ErrorKind>>,
    }
    impl Recorder {
        fn take(&self) -> Vec<(WatchState, PathBuf)> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }

        fn refuse(&self, error: Option<ErrorKind>) {
            *self.refusing.lock().unwrap() = error;
        }
    }
    #[async_trait]
    impl InboxListener for Arc<Recorder> {
        async fn on_startup(&self, _inbox: &Arc<Inbox>, existing: Vec<PathBuf>) -> Result<()> {
            let mut calls = self.calls.lock().unwrap();
            calls.extend(existing.into_iter().map(|path| (WatchState::Sweeping, path)));
            Ok(())
        }

        async fn on_create(&self, _inbox: &Arc<Inbox>, path: PathBuf) -> Result<()> {
            self.calls.lock().unwrap().push((WatchState::Live, path));
            let refusing = self.refusing.lock().unwrap().clone();
            match refusing {
                Some(error) => exn::bail!(error),
                None => Ok(()),
            }
        }
    }

    fn touch(layout: &Layout, name: &str) -> PathBuf {
        let path = layout.inbox.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[tokio::test]
    async fn every_file_is_reported_exactly_once() {
        let layout = Layout::new();
        let recorder = Arc::new(Recorder::default());
        let a = touch(&layout, "doi-10-5072-fk2-aaaaaav1.0.zip");
        let b = touch(&layout, "doi-10-5072-fk2-bbbbbbv1.1.zip");
        touch(&layout, "doi-10-5072-fk2-aaaaaa-datacite.v1.0.xml");
        touch(&layout, "README.txt");

        let inbox = Inbox { path: layout.inbox.clone(), cutoff: layout.inbox().cutoff };
        let mut poller = Poller::new(Classifier::new().unwrap(), [inbox.clone()], Arc::clone(&recorder));
        assert_eq!(poller.state(&inbox), Some(WatchState::Sweeping));

        poller.poll().await.unwrap();
        assert_eq!(poller.state(&inbox), Some(WatchState::Live));
        assert_eq!(recorder.take(), vec![(WatchState::Sweeping, a.clone()), (WatchState::Sweeping, b)]);

        poller.poll().await.unwrap();
        assert!(recorder.take().is_empty());

        let c = touch(&layout, "doi-10-5072-fk2-ccccccv2.0.zip");
        poller.poll().await.unwrap();
        poller.poll().await.unwrap();
        assert_eq!(recorder.take(), vec![(WatchState::Live, c)]);

        // Gone, then back under the same name: a new file.
        std::fs::remove_file(&a).unwrap();
        poller.poll().await.unwrap();
        touch(&layout, "doi-10-5072-fk2-aaaaaav1.0.zip");
        poller.poll().await.unwrap();
        assert_eq!(recorder.take(), vec![(WatchState::Live, a)]);
    }

    #[rstest]
    #[case::retryable(ErrorKind::Dispatch(PathBuf::from("busy")), 2)]
    #[case::permanent(ErrorKind::Worker, 1)]
    #[tokio::test]
    async fn only_retryable_failures_are_reported_again(#[case] error: ErrorKind, #[case] reported: usize) {
        let layout = Layout::new();
        let recorder = Arc::new(Recorder::default());
        let mut poller = Poller::new(Classifier::new().unwrap(), [(*layout.inbox()).clone()], Arc::clone(&recorder));
        poller.poll().await.unwrap();

        let a = touch(&layout, "doi-10-5072-fk2-aaaaaav1.0.zip");
        recorder.refuse(Some(error));
        poller.poll().await.unwrap();
        recorder.refuse(None);
        poller.poll().await.unwrap();
        poller.poll().await.unwrap();
        assert_eq!(recorder.take(), vec![(WatchState::Live, a); reported]);
    }

    #[tokio::test]
    async fn unlistable_inbox_is_fatal() {
        let layout = Layout::new();
        let missing = layout.inbox.join("missing");
        let inbox = Inbox { path: missing.clone(), cutoff: layout.inbox().cutoff };
        let mut poller = Poller::new(Classifier::new().unwrap(), [inbox], Arc::new(Recorder::default()));
        let err = poller.poll().await.unwrap_err();
        assert_eq!(*err.deref(), ErrorKind::Inbox(missing));
    }

    #[tokio::test]
    async fn run_returns_once_stopped() {
        let layout = Layout::new();
        let inbox = Inbox { path: layout.inbox.clone(), cutoff: layout.inbox().cutoff };
        let poller = Poller::new(Classifier::new().unwrap(), [inbox], Arc::new(Recorder::default()));
        let stop = CancellationToken::new();
        let handle = tokio::spawn(poller.run(Duration::from_millis(5), stop.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.cancel();
        handle.await.unwrap().unwrap();
    }
}
