//! # Bot abstraction.
//!
//! A [`Bot`] is the unit the manager launches: one connection to one remote
//! endpoint. The manager never looks inside; it only needs to run it, ask
//! whether it is still connected, and ask it to quit.

use std::sync::Arc;

use async_trait::async_trait;

use crate::bots::BotId;
use crate::error::BotError;

/// Shared handle to a bot, suitable for passing across tasks.
pub type BotRef = Arc<dyn Bot>;

/// # Opaque, long-lived network client.
///
/// [`run`](Bot::run) occupies its task for the whole connected lifetime and
/// resolves only on disconnect or error. [`quit`](Bot::quit) is a graceful,
/// fire-and-forget request: the manager does not wait for it and never aborts
/// a bot that ignores it.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use async_trait::async_trait;
/// use tokio::sync::Notify;
/// use fleetvisor::{Bot, BotError, BotId};
///
/// struct Echo {
///     connected: AtomicBool,
///     quit: Notify,
/// }
///
/// #[async_trait]
/// impl Bot for Echo {
///     fn name(&self) -> &str { "echo" }
///
///     async fn run(&self, _id: BotId) -> Result<(), BotError> {
///         self.connected.store(true, Ordering::Release);
///         self.quit.notified().await;
///         self.connected.store(false, Ordering::Release);
///         Ok(())
///     }
///
///     fn is_connected(&self) -> bool { self.connected.load(Ordering::Acquire) }
///
///     fn quit(&self) { self.quit.notify_one(); }
/// }
/// ```
#[async_trait]
pub trait Bot: Send + Sync + 'static {
    /// Returns a human-readable bot name (server, nick, ...), used in logs.
    fn name(&self) -> &str;

    /// Connects and serves until the connection ends.
    ///
    /// `id` is the identifier the manager assigned at launch.
    async fn run(&self, id: BotId) -> Result<(), BotError>;

    /// Returns `true` while the bot holds a live connection.
    fn is_connected(&self) -> bool;

    /// Requests a graceful disconnect. Must not block.
    ///
    /// May arrive before `run` has connected; the bot must remember it and
    /// end that run promptly.
    fn quit(&self);
}
