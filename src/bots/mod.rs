//! # Bot abstractions.
//!
//! This module provides the bot-related types:
//! - [`Bot`] - trait for an opaque, long-lived network client
//! - [`BotRef`] - shared reference to a bot (`Arc<dyn Bot>`)
//! - [`BotFn`] - closure-backed bot, handy for tests and demos
//! - [`BotHandle`] / [`BotId`] - a launched bot together with its manager-assigned id

mod bot;
mod bot_fn;
mod handle;

pub use bot::{Bot, BotRef};
pub use bot_fn::{BotContext, BotFn};
pub use handle::{BotHandle, BotId};
