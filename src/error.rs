//! Error types used by the fleet manager and by bots.
//!
//! This module defines three error enums:
//!
//! - [`ManagerError`] - contract violations and wait failures raised by the [`Manager`](crate::Manager).
//! - [`BotError`] - failures of an individual bot's run loop (contained, never surfaced by the manager).
//! - [`RespondError`] - failures replying to a [`Notice`](crate::Notice).
//!
//! Both [`ManagerError`] and [`BotError`] provide `as_label` for logs/metrics.

use thiserror::Error;

use crate::core::LifecycleState;

/// # Errors produced by the fleet manager.
///
/// `IllegalState` is a programmer error: it is returned synchronously at the call
/// site and never retried or recovered internally.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ManagerError {
    /// Operation invoked in a lifecycle phase that forbids it.
    #[error("cannot {op} while manager is {state}")]
    IllegalState {
        /// Operation that was rejected (`add_bot`, `start`, `stop`).
        op: &'static str,
        /// State observed when the call was rejected.
        state: LifecycleState,
    },

    /// The caller waiting for termination was cancelled.
    #[error("interrupted while waiting for bots to terminate")]
    Interrupted,

    /// The bot pool no longer accepts submissions.
    #[error("bot pool is closed")]
    PoolClosed,

    /// Installing the OS shutdown signal handlers failed.
    #[error("failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

impl ManagerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fleetvisor::{LifecycleState, ManagerError};
    ///
    /// let err = ManagerError::IllegalState { op: "start", state: LifecycleState::Running };
    /// assert_eq!(err.as_label(), "manager_illegal_state");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ManagerError::IllegalState { .. } => "manager_illegal_state",
            ManagerError::Interrupted => "manager_interrupted",
            ManagerError::PoolClosed => "manager_pool_closed",
            ManagerError::Signal(_) => "manager_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ManagerError::IllegalState { op, state } => format!("illegal {op} in state={state}"),
            ManagerError::Interrupted => "wait interrupted".to_string(),
            ManagerError::PoolClosed => "pool closed".to_string(),
            ManagerError::Signal(e) => format!("signal: {e}"),
        }
    }

    /// Returns `true` if this error reports a lifecycle contract violation.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, ManagerError::IllegalState { .. })
    }
}

/// # Errors produced by a bot's run loop.
///
/// The manager logs these and removes the bot from its registry; they never
/// abort sibling bots and are never returned from a manager operation.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BotError {
    /// The remote end closed the connection or the bot gave up on it.
    #[error("disconnected: {reason}")]
    Disconnected {
        /// Why the connection ended.
        reason: String,
    },

    /// Transport failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-recoverable error (bad credentials, protocol violation, ...).
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The run loop panicked; the panic was caught by the pool.
    #[error("bot panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl BotError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use fleetvisor::BotError;
    ///
    /// let err = BotError::Disconnected { reason: "eof".into() };
    /// assert_eq!(err.as_label(), "bot_disconnected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BotError::Disconnected { .. } => "bot_disconnected",
            BotError::Io(_) => "bot_io",
            BotError::Fatal { .. } => "bot_fatal",
            BotError::Panicked { .. } => "bot_panicked",
        }
    }
}

/// Errors replying to a notice.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RespondError {
    /// The notice has neither a channel nor a known sender to reply to.
    #[error("notice has no channel and no sender to respond to")]
    NoRecipient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_state_message_names_op_and_state() {
        let err = ManagerError::IllegalState {
            op: "stop",
            state: LifecycleState::New,
        };
        assert_eq!(err.to_string(), "cannot stop while manager is NEW");
        assert!(err.is_illegal_state());
        assert_eq!(err.as_message(), "illegal stop in state=NEW");
    }

    #[test]
    fn io_errors_convert_into_bot_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: BotError = io.into();
        assert_eq!(err.as_label(), "bot_io");
        assert!(err.to_string().contains("reset"));
    }
}
