//! # Fleet event subscribers.
//!
//! [`Subscribe`] is how code outside the manager watches a fleet: bot launches,
//! failures and removals, lifecycle transitions and shutdown progress. The
//! manager's listener task forwards every bus event to each registered
//! subscriber; a subscriber never runs inside a bot task or under a manager lock.
//!
//! ```text
//! Bus ──► listener ──► SubscriberSet ──► [queue per subscriber] ──► worker ──► on_event()
//! ```
//!
//! ## Rules
//! - A subscriber that falls behind loses events from its own queue only; each
//!   loss is reported as `EventKind::SubscriberOverflow` naming it.
//! - A panic in `on_event` is caught and reported as `EventKind::SubscriberPanicked`;
//!   the worker keeps delivering.
//! - Per subscriber, events arrive in the order the listener received them.
//! - Bots and `Manager` calls never wait for a subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use async_trait::async_trait;
//! use fleetvisor::{Event, EventKind, LifecycleState, Subscribe};
//!
//! #[derive(Default)]
//! struct FailureCount(AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for FailureCount {
//!     async fn on_event(&self, ev: &Event) {
//!         match ev.kind {
//!             EventKind::BotFailed => {
//!                 self.0.fetch_add(1, Ordering::Relaxed);
//!             }
//!             EventKind::StateChanged if ev.state == Some(LifecycleState::Terminated) => {
//!                 // fleet is down; flush whatever was counted
//!             }
//!             _ => {}
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-count" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Observer of one manager's events.
///
/// `on_event` runs on the subscriber's own worker. Blocking there stalls only
/// this subscriber's queue, and a panic costs only the event being handled.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event, such as a `BotFailed` with its `reason` or a
    /// `StateChanged` carrying the new lifecycle state.
    async fn on_event(&self, event: &Event);

    /// Name reported in `SubscriberOverflow`/`SubscriberPanicked` events.
    ///
    /// Defaults to `type_name::<Self>()`.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Events buffered for this subscriber before it starts losing them.
    /// Clamped to at least 1.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
