//! # Manager: registers, launches and shuts down a fleet of bots.
//!
//! The [`Manager`] owns the bot pool, the lifecycle state machine with its start
//! queue, and the registry of running bots. It is the only public control surface.
//!
//! ## Key responsibilities
//! - accept registrations: queue them before start, launch them immediately while running
//! - launch every queued bot exactly once, in registration order, on `start()`
//! - keep a race-free registry of launched-but-not-completed bots
//! - drive a cooperative shutdown and report when every bot has terminated
//!
//! ## High-level architecture
//! ```text
//! add_bot(bot) ──► [lifecycle lock]
//!                     ├─ NEW     → start queue
//!                     ├─ RUNNING → runner::launch() ──► [registry lock] spawn + insert
//!                     └─ other   → IllegalState
//!
//! start()      ──► NEW→STARTING, take queue ──► launch each ──► STARTING→RUNNING
//!
//! bot task     ──► bot.run(id) ──► runner::complete()
//!                                     ├─ [registry lock] remove
//!                                     └─ registry empty? ──► try_terminate()
//!
//! stop()       ──► RUNNING→STOPPING ──► close pool ──► quit() every admitted bot ──► try_terminate()
//!
//! stop_and_wait() ──► stop() ──► loop { log outstanding; pool.await_termination(poll) }
//! ```
//!
//! ## Locking
//! Two independent critical sections: the lifecycle (state + start queue) and the
//! registry. When both are needed they are always taken in that order, and the
//! completion hook releases the registry before asking for the lifecycle.
//!
//! ## Example
//! ```rust
//! use fleetvisor::{BotContext, BotError, BotFn, LifecycleState, Manager, ManagerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = Manager::builder(ManagerConfig::default()).build();
//!
//!     manager.add_bot(BotFn::arc("irc.libera.chat", |ctx: BotContext| async move {
//!         ctx.quit.cancelled().await;
//!         Ok::<_, BotError>(())
//!     }))?;
//!
//!     manager.start()?;
//!     assert_eq!(manager.state(), LifecycleState::Running);
//!
//!     manager.stop_and_wait().await?;
//!     assert_eq!(manager.state(), LifecycleState::Terminated);
//!     assert!(manager.bots().is_empty());
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bots::{BotHandle, BotRef};
use crate::core::builder::ManagerBuilder;
use crate::core::lifecycle::{Lifecycle, LifecycleState};
use crate::core::pool::BotPool;
use crate::core::registry::Registry;
use crate::core::{ManagerConfig, runner, shutdown};
use crate::error::ManagerError;
use crate::events::{Bus, Event, EventKind};

/// State shared between the manager and its bot tasks.
pub(crate) struct Shared {
    /// Manager number, used to label bot spans.
    pub(crate) number: u64,
    pub(crate) lifecycle: Mutex<Lifecycle>,
    pub(crate) registry: Registry,
    pub(crate) bus: Bus,
}

impl Shared {
    pub(crate) fn new(number: u64, bus: Bus) -> Self {
        Self {
            number,
            lifecycle: Mutex::new(Lifecycle::new()),
            registry: Registry::new(),
            bus,
        }
    }

    pub(crate) fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves `from → to` under the lifecycle lock and publishes the change.
    fn advance(
        &self,
        op: &'static str,
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<(), ManagerError> {
        let mut lc = self.lifecycle();
        lc.advance(op, from, to)?;
        self.bus.publish(Event::state_changed(to));
        Ok(())
    }

    /// Flips `STOPPING → TERMINATED` if the registry has drained.
    ///
    /// Re-checks both conditions under the lifecycle lock, so concurrent callers
    /// perform the transition at most once. Returns `true` for the caller that did.
    pub(crate) fn try_terminate(&self) -> bool {
        let mut lc = self.lifecycle();
        if lc.state() != LifecycleState::Stopping || !self.registry.is_empty() {
            return false;
        }
        if lc
            .advance("terminate", LifecycleState::Stopping, LifecycleState::Terminated)
            .is_err()
        {
            return false;
        }
        self.bus
            .publish(Event::state_changed(LifecycleState::Terminated));
        tracing::info!(manager = self.number, "all bots finished; manager terminated");
        true
    }
}

/// Manages the lifecycle of a fleet of bots sharing one task pool.
pub struct Manager {
    cfg: ManagerConfig,
    shared: Arc<Shared>,
    pool: BotPool,
    /// Stops the subscriber listener when the manager is dropped.
    listener: CancellationToken,
}

impl Manager {
    /// Returns a builder for a manager with the given config.
    pub fn builder(cfg: ManagerConfig) -> ManagerBuilder {
        ManagerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: ManagerConfig,
        shared: Arc<Shared>,
        pool: BotPool,
        listener: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            shared,
            pool,
            listener,
        }
    }

    /// Manager number given at construction.
    pub fn number(&self) -> u64 {
        self.shared.number
    }

    /// Returns the configuration this manager was built with.
    pub fn config(&self) -> &ManagerConfig {
        &self.cfg
    }

    /// Current lifecycle state. Stale as soon as it returns.
    pub fn state(&self) -> LifecycleState {
        self.shared.lifecycle().state()
    }

    /// Subscribes to manager events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    /// Registers a bot.
    ///
    /// - `NEW`: the bot is queued and launched by [`start`](Self::start).
    /// - `RUNNING`: the bot is launched immediately.
    /// - any other state: fails with [`ManagerError::IllegalState`] and changes nothing.
    pub fn add_bot(&self, bot: BotRef) -> Result<(), ManagerError> {
        let mut lc = self.shared.lifecycle();
        match lc.state() {
            LifecycleState::New => {
                tracing::debug!(name = bot.name(), "not started yet; bot queued");
                let name = bot.name().to_owned();
                lc.enqueue(bot)?;
                self.shared
                    .bus
                    .publish(Event::new(EventKind::BotQueued).with_name(name));
            }
            LifecycleState::Running => {
                tracing::debug!(name = bot.name(), "already running; launching bot now");
                runner::launch(&self.shared, &self.pool, bot)?;
            }
            state => {
                return Err(ManagerError::IllegalState {
                    op: "add_bot",
                    state,
                });
            }
        }
        Ok(())
    }

    /// Launches every queued bot, in registration order, and moves to `RUNNING`.
    ///
    /// Callable exactly once, from `NEW`.
    pub fn start(&self) -> Result<(), ManagerError> {
        let queued = {
            let mut lc = self.shared.lifecycle();
            lc.advance("start", LifecycleState::New, LifecycleState::Starting)?;
            self.shared
                .bus
                .publish(Event::state_changed(LifecycleState::Starting));
            lc.take_queue()
        };

        let count = queued.len();
        for bot in queued {
            runner::launch(&self.shared, &self.pool, bot)?;
        }

        self.shared
            .advance("start", LifecycleState::Starting, LifecycleState::Running)?;
        tracing::info!(manager = self.number(), bots = count, "manager started");
        Ok(())
    }

    /// Begins a graceful shutdown.
    ///
    /// Closes the pool to new work, then asks every registered bot that was
    /// admitted to run or reports itself connected to quit. Bots still waiting
    /// for admission never run. Bots that ignore the request keep running.
    /// Callable exactly once, from `RUNNING`.
    pub fn stop(&self) -> Result<(), ManagerError> {
        self.shared
            .advance("stop", LifecycleState::Running, LifecycleState::Stopping)?;

        // Close first: a bot not admitted by now is refused and never runs.
        self.pool.close();
        let asked = self.shared.registry.quit_live();
        for handle in &asked {
            tracing::debug!(bot = %handle.id(), name = handle.name(), "quit requested");
            self.shared.bus.publish(
                Event::new(EventKind::QuitRequested).with_bot(handle.id(), handle.name()),
            );
        }

        tracing::info!(
            manager = self.number(),
            registered = self.shared.registry.len(),
            quit = asked.len(),
            "manager stopping; pool closed to new bots"
        );
        self.shared.try_terminate();
        Ok(())
    }

    /// Calls [`stop`](Self::stop) and waits until every bot has terminated,
    /// logging outstanding bots every [`ManagerConfig::poll_interval`].
    pub async fn stop_and_wait(&self) -> Result<(), ManagerError> {
        self.stop_and_wait_with(self.cfg.poll_interval_clamped(), CancellationToken::new())
            .await
    }

    /// Calls [`stop`](Self::stop) and waits until every bot has terminated.
    ///
    /// Outstanding bots are logged every `poll`. If `cancel` fires first, returns
    /// [`ManagerError::Interrupted`]; the shutdown itself continues unaffected.
    pub async fn stop_and_wait_with(
        &self,
        poll: Duration,
        cancel: CancellationToken,
    ) -> Result<(), ManagerError> {
        self.stop()?;
        let poll = poll.max(Duration::from_millis(1));

        loop {
            let outstanding = self.shared.registry.outstanding();
            if !outstanding.is_empty() {
                tracing::debug!(
                    bots = ?outstanding,
                    "waiting {poll:?} for bots to terminate"
                );
                self.shared
                    .bus
                    .publish(Event::new(EventKind::WaitingForBots).with_outstanding(outstanding.len()));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("interrupted while waiting for bots to terminate");
                    return Err(ManagerError::Interrupted);
                }
                done = self.pool.await_termination(poll) => {
                    if done {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Starts the fleet, runs until the process receives a termination signal,
    /// then stops and waits for every bot.
    pub async fn run_until_shutdown_signal(&self) -> Result<(), ManagerError> {
        self.start()?;
        shutdown::wait_for_shutdown_signal().await?;
        tracing::info!(manager = self.number(), "shutdown signal received");
        self.shared
            .bus
            .publish(Event::new(EventKind::ShutdownRequested));
        self.stop_and_wait().await
    }

    /// Returns a point-in-time copy of the launched, not yet completed bots,
    /// sorted by id. It is not kept in sync with later launches or completions.
    pub fn bots(&self) -> Vec<BotHandle> {
        self.shared.registry.snapshot()
    }

    /// Number of bots waiting in the start queue (non-zero only while `NEW`).
    pub fn queued(&self) -> usize {
        self.shared.lifecycle().queued()
    }

    /// Number of bot tasks submitted to the pool that have not finished.
    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.listener.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::{BotContext, BotFn};
    use crate::error::BotError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager() -> Manager {
        Manager::builder(ManagerConfig::default()).build()
    }

    fn quitting_bot(name: &'static str, runs: Arc<AtomicUsize>) -> BotRef {
        BotFn::arc(name, move |ctx: BotContext| {
            let runs = runs.clone();
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                ctx.quit.cancelled().await;
                Ok::<_, BotError>(())
            }
        })
    }

    async fn eventually(what: &str, mut cond: impl FnMut() -> bool) {
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "timed out waiting for: {what}");
    }

    #[tokio::test]
    async fn queued_bots_wait_for_start() {
        let runs = Arc::new(AtomicUsize::new(0));
        let m = manager();
        m.add_bot(quitting_bot("a", runs.clone())).unwrap();
        m.add_bot(quitting_bot("b", runs.clone())).unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(m.bots().is_empty());
        assert_eq!(m.queued(), 2);

        m.start().unwrap();
        assert_eq!(m.state(), LifecycleState::Running);
        assert_eq!(m.queued(), 0);

        let names: Vec<String> = m.bots().iter().map(|h| h.name().to_string()).collect();
        assert_eq!(names, ["a", "b"]);
        eventually("both bots running", || runs.load(Ordering::SeqCst) == 2).await;

        m.stop_and_wait().await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn start_and_stop_are_single_shot() {
        let m = manager();
        assert!(m.stop().unwrap_err().is_illegal_state());

        m.start().unwrap();
        let err = m.start().unwrap_err();
        assert!(matches!(
            err,
            ManagerError::IllegalState {
                op: "start",
                state: LifecycleState::Running
            }
        ));

        m.stop().unwrap();
        assert!(m.stop().unwrap_err().is_illegal_state());
        assert!(m.start().unwrap_err().is_illegal_state());
    }

    #[tokio::test]
    async fn stop_with_no_bots_terminates_immediately() {
        let m = manager();
        m.start().unwrap();
        m.stop().unwrap();
        assert_eq!(m.state(), LifecycleState::Terminated);
        let err = m.stop_and_wait().await.unwrap_err();
        assert!(err.is_illegal_state(), "{err}");
    }

    #[tokio::test]
    async fn add_bot_after_stop_is_rejected_without_side_effects() {
        let runs = Arc::new(AtomicUsize::new(0));
        let m = manager();
        m.start().unwrap();
        m.add_bot(quitting_bot("keep", runs.clone())).unwrap();
        eventually("bot running", || runs.load(Ordering::SeqCst) == 1).await;

        m.stop().unwrap();
        let err = m.add_bot(quitting_bot("late", runs.clone())).unwrap_err();
        assert!(matches!(
            err,
            ManagerError::IllegalState {
                op: "add_bot",
                ..
            }
        ));
        assert_eq!(m.queued(), 0);
        assert!(m.bots().iter().all(|h| h.name() == "keep"));

        let err = m
            .stop_and_wait_with(Duration::from_millis(10), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_illegal_state(), "{err}");
        eventually("terminated", || m.state() == LifecycleState::Terminated).await;
        assert!(m.add_bot(quitting_bot("later", runs.clone())).is_err());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_bot_is_removed_and_siblings_keep_running() {
        let runs = Arc::new(AtomicUsize::new(0));
        let m = manager();
        let mut events = m.subscribe();
        m.start().unwrap();

        m.add_bot(BotFn::arc("crash", |_ctx: BotContext| async move {
            Err::<(), _>(BotError::Fatal {
                error: "bad password".into(),
            })
        }))
        .unwrap();
        m.add_bot(quitting_bot("steady", runs.clone())).unwrap();

        eventually("crashed bot removed", || m.bots().len() == 1).await;
        assert_eq!(m.bots()[0].name(), "steady");
        assert_eq!(m.state(), LifecycleState::Running);

        let mut failed = None;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::BotFailed {
                failed = ev.reason.clone();
            }
        }
        assert_eq!(failed.as_deref(), Some("fatal error: bad password"));

        m.stop_and_wait().await.unwrap();
        assert_eq!(m.state(), LifecycleState::Terminated);
    }

    #[tokio::test]
    async fn panicking_bot_is_contained() {
        let m = manager();
        m.start().unwrap();
        m.add_bot(BotFn::arc("boom", |_ctx: BotContext| async move {
            let parsed: Option<u32> = None;
            parsed.expect("protocol parser exploded");
            Ok::<_, BotError>(())
        }))
        .unwrap();

        eventually("panicked bot removed", || m.bots().is_empty()).await;
        m.stop_and_wait().await.unwrap();
        assert_eq!(m.state(), LifecycleState::Terminated);
    }

    #[tokio::test]
    async fn managers_count_ids_independently() {
        let a = Manager::builder(ManagerConfig::default())
            .with_number(1)
            .build();
        let b = Manager::builder(ManagerConfig::default())
            .with_number(2)
            .build();
        a.start().unwrap();
        b.start().unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        a.add_bot(quitting_bot("a0", runs.clone())).unwrap();
        b.add_bot(quitting_bot("b0", runs.clone())).unwrap();

        assert_eq!(a.bots()[0].id().get(), 0);
        assert_eq!(b.bots()[0].id().get(), 0);
        assert_eq!((a.number(), b.number()), (1, 2));

        a.stop_and_wait().await.unwrap();
        b.stop_and_wait().await.unwrap();
    }
}
