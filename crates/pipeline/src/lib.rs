//! Moves Dataset Version Exports from their inboxes into the mirror store.
//!
//! The [`MirroringService`] polls each inbox and hands new exports to a
//! [`Dispatcher`], which takes ownership of the file by moving it into the
//! work directory and submits a [`process`] task to a bounded
//! [`WorkerPool`]. Each task ends in exactly one [`Outcome`]: stored,
//! discarded or quarantined.

mod context;
mod dispatch;
pub mod error;
mod health;
mod pool;
mod service;
mod task;
#[cfg(test)]
mod testing;
mod watch;

pub use crate::context::{Context, Inbox};
pub use crate::dispatch::Dispatcher;
pub use crate::health::{InboxStatus, inbox_status};
pub use crate::pool::WorkerPool;
pub use crate::service::MirroringService;
pub use crate::task::{Discard, Outcome, process};
pub use crate::watch::{InboxListener, Poller, WatchState};
