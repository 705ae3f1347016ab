//! # Bot pool: one Tokio task per bot.
//!
//! [`BotPool`] runs bot tasks on a runtime handle and tracks them with a
//! [`TaskTracker`], which gives it executor-style shutdown semantics:
//!
//! ```text
//! spawn()  ──► tracker.track_future(fut) ──► runtime.spawn(..)
//! close()  ──► reject new spawns, in-flight tasks keep running
//! await_termination(t) ──► closed && every tracked task finished (within t)?
//! ```
//!
//! With a concurrency limit, each task first passes a [`Gate`]: it waits for a
//! semaphore slot, unless the pool closes first.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::ManagerError;

/// Task pool shared by every bot of one manager.
pub(crate) struct BotPool {
    runtime: Handle,
    tracker: TaskTracker,
    closed: CancellationToken,
    slots: Option<Arc<Semaphore>>,
}

impl BotPool {
    /// Creates a pool on `runtime`, optionally capped at `limit` concurrent bots.
    pub(crate) fn new(runtime: Handle, limit: Option<usize>) -> Self {
        Self {
            runtime,
            tracker: TaskTracker::new(),
            closed: CancellationToken::new(),
            slots: limit.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Submits a task. Fails once the pool is closed.
    pub(crate) fn spawn<F>(&self, fut: F) -> Result<JoinHandle<()>, ManagerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.tracker.is_closed() {
            return Err(ManagerError::PoolClosed);
        }
        Ok(self.runtime.spawn(self.tracker.track_future(fut)))
    }

    /// Returns the admission gate a task passes before running its bot.
    pub(crate) fn gate(&self) -> Gate {
        Gate {
            slots: self.slots.clone(),
            closed: self.closed.clone(),
        }
    }

    /// Stops accepting submissions. Tasks already submitted keep running.
    pub(crate) fn close(&self) {
        self.tracker.close();
        self.closed.cancel();
    }

    /// Number of submitted tasks that have not finished yet.
    pub(crate) fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits up to `timeout` for the pool to be closed and drained.
    ///
    /// Returns `true` if it terminated within the timeout.
    pub(crate) async fn await_termination(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok()
    }
}

/// Admission gate for one bot task.
pub(crate) struct Gate {
    slots: Option<Arc<Semaphore>>,
    closed: CancellationToken,
}

/// Running slot held for the whole run of a bot.
pub(crate) struct Slot {
    _permit: Option<OwnedSemaphorePermit>,
    closed: CancellationToken,
}

impl Slot {
    /// Cancelled once the pool closes; checked again when the bot is admitted.
    pub(crate) fn closed(&self) -> &CancellationToken {
        &self.closed
    }
}

impl Gate {
    /// Resolves to a slot, or `None` if the pool closed before the bot could start.
    pub(crate) async fn enter(self) -> Option<Slot> {
        if self.closed.is_cancelled() {
            return None;
        }
        let closed = self.closed;
        let Some(slots) = self.slots else {
            return Some(Slot {
                _permit: None,
                closed,
            });
        };

        tokio::select! {
            biased;
            _ = closed.cancelled() => None,
            permit = slots.acquire_owned() => permit.ok().map(|p| Slot {
                _permit: Some(p),
                closed: closed.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn close_rejects_new_work_and_terminates_when_drained() {
        let pool = BotPool::new(Handle::current(), None);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        pool.spawn(async move {
            let _ = rx.await;
        })
        .unwrap();
        assert_eq!(pool.in_flight(), 1);

        pool.close();
        assert!(matches!(
            pool.spawn(async {}),
            Err(ManagerError::PoolClosed)
        ));
        assert!(!pool.await_termination(Duration::from_millis(20)).await);

        tx.send(()).unwrap();
        assert!(pool.await_termination(Duration::from_secs(2)).await);
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test]
    async fn open_pool_never_reports_termination() {
        let pool = BotPool::new(Handle::current(), None);
        assert!(!pool.await_termination(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn gate_refuses_entry_after_close() {
        let pool = BotPool::new(Handle::current(), Some(1));
        let held = pool.gate().enter().await.expect("first slot");

        let waiting = pool.gate();
        let ran = Arc::new(AtomicUsize::new(0));
        let ran2 = ran.clone();
        let task = tokio::spawn(async move {
            if waiting.enter().await.is_some() {
                ran2.fetch_add(1, Ordering::SeqCst);
            }
        });

        pool.close();
        assert!(held.closed().is_cancelled());
        drop(held);
        task.await.unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert!(pool.gate().enter().await.is_none());
    }
}
