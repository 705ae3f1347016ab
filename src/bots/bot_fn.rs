//! # Function-backed bot (`BotFn`)
//!
//! [`BotFn`] wraps a closure `F: Fn(BotContext) -> Fut` and supplies the
//! liveness flag and quit signal itself, so the closure only has to watch
//! [`BotContext::quit`].
//!
//! ## Example
//! ```rust
//! use fleetvisor::{BotContext, BotError, BotFn, BotRef};
//!
//! let bot: BotRef = BotFn::arc("irc.example.org", |ctx: BotContext| async move {
//!     ctx.quit.cancelled().await;
//!     Ok::<_, BotError>(())
//! });
//!
//! assert_eq!(bot.name(), "irc.example.org");
//! assert!(!bot.is_connected());
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::bots::{Bot, BotId};
use crate::error::BotError;

/// Per-run context handed to a [`BotFn`] closure.
#[derive(Clone, Debug)]
pub struct BotContext {
    /// Identifier assigned by the manager.
    pub id: BotId,
    /// Cancelled when [`Bot::quit`] is called.
    pub quit: CancellationToken,
}

/// Closure-backed bot implementation.
pub struct BotFn<F> {
    name: Cow<'static, str>,
    f: F,
    connected: AtomicBool,
    quit: CancellationToken,
}

impl<F> BotFn<F> {
    /// Creates a new function-backed bot.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            connected: AtomicBool::new(false),
            quit: CancellationToken::new(),
        }
    }

    /// Creates the bot and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }

    /// Returns `true` once [`Bot::quit`] has been requested.
    pub fn quit_requested(&self) -> bool {
        self.quit.is_cancelled()
    }
}

/// Clears the connected flag however the run future ends (including panics).
struct Connected<'a>(&'a AtomicBool);

impl<'a> Connected<'a> {
    fn mark(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for Connected<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[async_trait]
impl<F, Fut> Bot for BotFn<F>
where
    F: Fn(BotContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BotError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, id: BotId) -> Result<(), BotError> {
        let _connected = Connected::mark(&self.connected);
        let ctx = BotContext {
            id,
            quit: self.quit.clone(),
        };
        (self.f)(ctx).await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn quit(&self) {
        self.quit.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connected_only_while_running() {
        let bot = BotFn::arc("t", |ctx: BotContext| async move {
            ctx.quit.cancelled().await;
            Ok::<_, BotError>(())
        });

        assert!(!bot.is_connected());
        let runner = {
            let bot = Arc::clone(&bot);
            tokio::spawn(async move { bot.run(BotId::new(7)).await })
        };

        while !bot.is_connected() {
            tokio::task::yield_now().await;
        }
        bot.quit();
        assert!(bot.quit_requested());

        runner.await.expect("join").expect("run");
        assert!(!bot.is_connected());
    }

    #[tokio::test]
    async fn closure_sees_assigned_id() {
        let bot = BotFn::new("t", |ctx: BotContext| async move {
            if ctx.id == BotId::new(3) {
                Ok::<_, BotError>(())
            } else {
                Err(BotError::Fatal { error: "wrong id".into() })
            }
        });
        assert!(bot.run(BotId::new(3)).await.is_ok());
        assert!(bot.run(BotId::new(4)).await.is_err());
    }
}
