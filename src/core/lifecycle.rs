//! # Fleet lifecycle state and start queue.
//!
//! [`LifecycleState`] is the single source of truth for which phase the fleet
//! is in. [`Lifecycle`] pairs it with the start queue; both live behind one
//! lock inside the manager.
//!
//! ## Transitions
//! ```text
//! NEW ──start()──► STARTING ──(queue drained)──► RUNNING ──stop()──► STOPPING ──(registry empty)──► TERMINATED
//! ```
//!
//! ## Rules
//! - States only move forward; every transition checks its precondition.
//! - The queue accepts bots only while `NEW` and is drained exactly once.

use std::fmt;

use crate::bots::BotRef;
use crate::error::ManagerError;

/// Fleet-wide lifecycle phase, ordered by progression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Built, not started; registrations are queued.
    New,
    /// `start()` is launching the queued bots.
    Starting,
    /// Registrations launch immediately.
    Running,
    /// `stop()` was called; waiting for bots to finish.
    Stopping,
    /// Every bot finished after a stop.
    Terminated,
}

impl LifecycleState {
    /// Returns the state name as used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::New => "NEW",
            LifecycleState::Starting => "STARTING",
            LifecycleState::Running => "RUNNING",
            LifecycleState::Stopping => "STOPPING",
            LifecycleState::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state plus the queue of bots registered before start.
pub(crate) struct Lifecycle {
    state: LifecycleState,
    queue: Vec<BotRef>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: LifecycleState::New,
            queue: Vec::new(),
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        self.state
    }

    /// Moves from `from` to `to`, or reports the current state as illegal for `op`.
    pub(crate) fn advance(
        &mut self,
        op: &'static str,
        from: LifecycleState,
        to: LifecycleState,
    ) -> Result<(), ManagerError> {
        debug_assert!(from < to, "lifecycle transitions only move forward");
        if self.state != from {
            return Err(ManagerError::IllegalState {
                op,
                state: self.state,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Appends a bot to the start queue. Only legal while `NEW`.
    pub(crate) fn enqueue(&mut self, bot: BotRef) -> Result<(), ManagerError> {
        if self.state != LifecycleState::New {
            return Err(ManagerError::IllegalState {
                op: "add_bot",
                state: self.state,
            });
        }
        self.queue.push(bot);
        Ok(())
    }

    /// Drains the start queue in registration order.
    pub(crate) fn take_queue(&mut self) -> Vec<BotRef> {
        std::mem::take(&mut self.queue)
    }

    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::{BotContext, BotFn};

    fn idle_bot(name: &'static str) -> BotRef {
        BotFn::arc(name, |ctx: BotContext| async move {
            ctx.quit.cancelled().await;
            Ok::<_, crate::error::BotError>(())
        })
    }

    #[test]
    fn states_are_ordered_by_progression() {
        use LifecycleState::*;
        assert!(New < Starting && Starting < Running);
        assert!(Running < Stopping && Stopping < Terminated);
        assert_eq!(Stopping.to_string(), "STOPPING");
    }

    #[test]
    fn advance_checks_precondition() {
        let mut lc = Lifecycle::new();
        lc.advance("start", LifecycleState::New, LifecycleState::Starting)
            .unwrap();

        let err = lc
            .advance("start", LifecycleState::New, LifecycleState::Starting)
            .unwrap_err();
        assert!(matches!(
            err,
            ManagerError::IllegalState {
                op: "start",
                state: LifecycleState::Starting
            }
        ));
        assert_eq!(lc.state(), LifecycleState::Starting);
    }

    #[test]
    fn queue_is_ordered_and_drained_once() {
        let mut lc = Lifecycle::new();
        lc.enqueue(idle_bot("a")).unwrap();
        lc.enqueue(idle_bot("b")).unwrap();
        assert_eq!(lc.queued(), 2);

        let names: Vec<String> = lc
            .take_queue()
            .iter()
            .map(|b| b.name().to_string())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(lc.queued(), 0);
        assert!(lc.take_queue().is_empty());
    }

    #[test]
    fn enqueue_is_rejected_after_new() {
        let mut lc = Lifecycle::new();
        lc.advance("start", LifecycleState::New, LifecycleState::Starting)
            .unwrap();
        assert!(lc.enqueue(idle_bot("late")).is_err());
        assert_eq!(lc.queued(), 0);
    }
}
