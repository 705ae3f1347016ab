//! # Registry of launched bots.
//!
//! The registry is the authoritative record of bots that were launched and
//! have not completed yet. One map, one lock, used by every reader and writer.
//!
//! ## Architecture
//! ```text
//! launch_with(bot, spawn) ──► [lock] id = next_id(); join = spawn(handle); insert(id, entry) [unlock]
//! admit(id, closed)       ──► [lock] closed? refuse : mark admitted [unlock]
//! remove(id)              ──► [lock] remove(id) → remaining count [unlock]
//! snapshot()              ──► [lock] clone handles, sort by id [unlock]
//! quit_live()             ──► [lock] bot.quit() for every admitted or connected entry [unlock]
//! ```
//!
//! ## Rules
//! - The bot task is spawned **while the lock is held**; its completion hook must
//!   take the same lock, so it always finds its own entry.
//! - Ids come from a per-registry counter and are never reused.
//! - The pool is closed before `quit_live` runs, and `admit` re-checks the
//!   close under the lock: a bot either is admitted before the quit pass (and
//!   is asked to quit) or is refused and never runs.
//! - No `.await` ever happens under the lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bots::{BotHandle, BotId, BotRef};
use crate::error::ManagerError;

/// One launched bot and its running task.
struct Entry {
    handle: BotHandle,
    join: JoinHandle<()>,
    /// Passed the pool gate; `run` is about to be or has been called.
    admitted: bool,
}

/// Lock-protected map of launched-but-not-completed bots.
pub(crate) struct Registry {
    entries: Mutex<HashMap<BotId, Entry>>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BotId, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Assigns an id to `bot`, spawns its task via `spawn` and records the entry,
    /// all inside one critical section.
    pub(crate) fn launch_with<F>(&self, bot: BotRef, spawn: F) -> Result<BotHandle, ManagerError>
    where
        F: FnOnce(&BotHandle) -> Result<JoinHandle<()>, ManagerError>,
    {
        let mut entries = self.lock();
        let id = BotId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = BotHandle::new(id, bot);
        let join = spawn(&handle)?;
        entries.insert(
            id,
            Entry {
                handle: handle.clone(),
                join,
                admitted: false,
            },
        );
        Ok(handle)
    }

    /// Marks `id` as admitted to run, unless the pool has already closed.
    ///
    /// Returns `false` if the bot must not run.
    pub(crate) fn admit(&self, id: BotId, closed: &CancellationToken) -> bool {
        let mut entries = self.lock();
        if closed.is_cancelled() {
            return false;
        }
        match entries.get_mut(&id) {
            Some(entry) => {
                entry.admitted = true;
                true
            }
            None => false,
        }
    }

    /// Removes the entry for `id`.
    ///
    /// Returns the number of entries left, or `None` if `id` was not registered.
    pub(crate) fn remove(&self, id: BotId) -> Option<usize> {
        let mut entries = self.lock();
        entries.remove(&id).map(|_| entries.len())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Point-in-time copy of the registered handles, sorted by id.
    pub(crate) fn snapshot(&self) -> Vec<BotHandle> {
        let entries = self.lock();
        let mut bots: Vec<BotHandle> = entries.values().map(|e| e.handle.clone()).collect();
        bots.sort_unstable();
        bots
    }

    /// Describes outstanding tasks for progress logs: `name#id`, plus `(exiting)`
    /// when the task already returned but its hook has not run yet.
    pub(crate) fn outstanding(&self) -> Vec<String> {
        let entries = self.lock();
        let mut out: Vec<(BotId, String)> = entries
            .values()
            .map(|e| {
                let id = e.handle.id();
                let mut label = format!("{}#{id}", e.handle.name());
                if e.join.is_finished() {
                    label.push_str(" (exiting)");
                }
                (id, label)
            })
            .collect();
        out.sort_unstable_by_key(|(id, _)| *id);
        out.into_iter().map(|(_, label)| label).collect()
    }

    /// Requests a graceful quit from every registered bot that was admitted to
    /// run or reports itself connected. Returns the bots that were asked.
    pub(crate) fn quit_live(&self) -> Vec<BotHandle> {
        let entries = self.lock();
        let mut asked = Vec::new();
        for entry in entries
            .values()
            .filter(|e| e.admitted || e.handle.is_connected())
        {
            entry.handle.bot().quit();
            asked.push(entry.handle.clone());
        }
        asked.sort_unstable();
        asked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::{BotContext, BotFn};

    fn bot(name: &'static str) -> BotRef {
        BotFn::arc(name, |ctx: BotContext| async move {
            ctx.quit.cancelled().await;
            Ok::<_, crate::error::BotError>(())
        })
    }

    #[tokio::test]
    async fn ids_are_unique_and_removal_is_exactly_once() {
        let reg = Registry::new();
        let a = reg
            .launch_with(bot("a"), |_| Ok(tokio::spawn(async {})))
            .unwrap();
        let b = reg
            .launch_with(bot("b"), |_| Ok(tokio::spawn(async {})))
            .unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(reg.len(), 2);

        assert_eq!(reg.remove(a.id()), Some(1));
        assert_eq!(reg.remove(a.id()), None);
        assert_eq!(reg.remove(b.id()), Some(0));
        assert!(reg.is_empty());
    }

    #[tokio::test]
    async fn failed_spawn_leaves_no_entry() {
        let reg = Registry::new();
        let res = reg.launch_with(bot("a"), |_| Err(ManagerError::PoolClosed));
        assert!(matches!(res, Err(ManagerError::PoolClosed)));
        assert!(reg.is_empty());
    }

    #[tokio::test]
    async fn snapshot_is_sorted_and_detached() {
        let reg = Registry::new();
        for name in ["x", "y", "z"] {
            reg.launch_with(bot(name), |_| Ok(tokio::spawn(async {})))
                .unwrap();
        }
        let snap = reg.snapshot();
        let ids: Vec<u64> = snap.iter().map(|h| h.id().get()).collect();
        assert_eq!(ids, [0, 1, 2]);

        reg.remove(BotId::new(1));
        assert_eq!(snap.len(), 3);
        assert_eq!(reg.snapshot().len(), 2);
        assert_eq!(reg.outstanding().len(), 2);
    }

    #[tokio::test]
    async fn quit_skips_bots_never_admitted() {
        let reg = Registry::new();
        reg.launch_with(bot("idle"), |_| Ok(tokio::spawn(async {})))
            .unwrap();
        assert!(reg.quit_live().is_empty());
    }

    #[tokio::test]
    async fn admitted_bot_is_asked_to_quit_before_connecting() {
        let reg = Registry::new();
        let open = CancellationToken::new();
        let h = reg
            .launch_with(bot("fresh"), |_| Ok(tokio::spawn(async {})))
            .unwrap();

        assert!(reg.admit(h.id(), &open));
        assert!(!h.is_connected());
        let asked = reg.quit_live();
        assert_eq!(asked, [h]);
    }

    #[tokio::test]
    async fn admit_is_refused_once_closed() {
        let reg = Registry::new();
        let closed = CancellationToken::new();
        let h = reg
            .launch_with(bot("late"), |_| Ok(tokio::spawn(async {})))
            .unwrap();

        closed.cancel();
        assert!(!reg.admit(h.id(), &closed));
        assert!(reg.quit_live().is_empty());
        assert!(!reg.admit(BotId::new(99), &CancellationToken::new()));
    }
}
