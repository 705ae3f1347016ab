//! # Events emitted by the fleet manager and its bot tasks.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Lifecycle events**: manager phase changes and shutdown progress
//! - **Bot events**: queueing, launch, completion and removal of a bot
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries metadata such as timestamps, bot id and name,
//! the new lifecycle state and failure reasons.
//!
//! ## Example
//! ```rust
//! use fleetvisor::{BotId, Event, EventKind};
//!
//! let ev = Event::new(EventKind::BotFailed)
//!     .with_bot(BotId::new(4), "irc.libera.chat")
//!     .with_reason("connection reset");
//!
//! assert_eq!(ev.kind, EventKind::BotFailed);
//! assert_eq!(ev.bot, Some(BotId::new(4)));
//! assert_eq!(ev.reason.as_deref(), Some("connection reset"));
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use crate::bots::BotId;
use crate::core::LifecycleState;

/// Classification of manager events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Lifecycle events ===
    /// Manager moved to a new lifecycle state.
    ///
    /// Sets:
    /// - `state`: the new state
    StateChanged,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// `stop_and_wait` is still waiting for bots to terminate.
    ///
    /// Sets:
    /// - `outstanding`: number of bots still registered
    WaitingForBots,

    // === Bot events ===
    /// Bot registered before start; it will be launched by `start()`.
    ///
    /// Sets:
    /// - `name`: bot name
    BotQueued,

    /// Bot submitted to the pool and recorded in the registry.
    ///
    /// Sets:
    /// - `bot`, `name`
    BotLaunched,

    /// Bot run loop returned normally (or never started because the pool closed).
    ///
    /// Sets:
    /// - `bot`, `name`
    BotFinished,

    /// Bot run loop ended with an error or a panic.
    ///
    /// Sets:
    /// - `bot`, `name`
    /// - `reason`: failure message
    BotFailed,

    /// Bot removed from the registry (always follows `BotFinished`/`BotFailed`).
    ///
    /// Sets:
    /// - `bot`, `name`
    BotRemoved,

    /// Graceful quit requested from a connected bot during `stop()`.
    ///
    /// Sets:
    /// - `bot`, `name`
    QuitRequested,
}

/// Manager event with optional metadata.
///
/// - `seq`: sequence number stamped by the [`Bus`](crate::events::Bus) on publish
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Per-bus unique sequence number, increasing in publish order.
    ///
    /// Concurrent publishers may deliver events slightly out of `seq` order;
    /// sort by `seq` to restore the exact order.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Bot identifier, if applicable.
    pub bot: Option<BotId>,
    /// Bot or subscriber name, if applicable.
    pub name: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// New lifecycle state (for `StateChanged`).
    pub state: Option<LifecycleState>,
    /// Number of bots still registered (for `WaitingForBots`).
    pub outstanding: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp.
    ///
    /// The sequence number is assigned when the event is published.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            kind,
            bot: None,
            name: None,
            reason: None,
            state: None,
            outstanding: None,
        }
    }

    /// Attaches a bot id and name.
    #[inline]
    pub fn with_bot(mut self, id: BotId, name: impl Into<Arc<str>>) -> Self {
        self.bot = Some(id);
        self.name = Some(name.into());
        self
    }

    /// Attaches a name without an id (queued bots, subscribers).
    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a lifecycle state.
    #[inline]
    pub fn with_state(mut self, state: LifecycleState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches the number of outstanding bots.
    #[inline]
    pub fn with_outstanding(mut self, n: usize) -> Self {
        self.outstanding = Some(n);
        self
    }

    /// Creates a state change event.
    #[inline]
    pub fn state_changed(state: LifecycleState) -> Self {
        Event::new(EventKind::StateChanged).with_state(state)
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_name(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_name(subscriber)
            .with_reason(info)
    }
}
