//! # Launched bot handles.
//!
//! [`BotHandle`] pairs a [`BotRef`] with the [`BotId`] the manager assigned when
//! it launched the bot. Handles compare, hash and order by id only.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::bots::BotRef;

/// Manager-scoped bot identifier, unique for the lifetime of one manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BotId(u64);

impl BotId {
    /// Wraps a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A bot as seen by the manager after launch.
#[derive(Clone)]
pub struct BotHandle {
    id: BotId,
    bot: BotRef,
}

impl BotHandle {
    pub(crate) fn new(id: BotId, bot: BotRef) -> Self {
        Self { id, bot }
    }

    /// Identifier assigned at launch.
    pub fn id(&self) -> BotId {
        self.id
    }

    /// Convenience: returns the bot name.
    pub fn name(&self) -> &str {
        self.bot.name()
    }

    /// Returns the underlying bot.
    pub fn bot(&self) -> &BotRef {
        &self.bot
    }

    /// Returns `true` if this handle wraps exactly `bot`.
    pub fn is(&self, bot: &BotRef) -> bool {
        Arc::ptr_eq(&self.bot, bot)
    }

    /// Convenience: asks the bot whether it is connected.
    pub fn is_connected(&self) -> bool {
        self.bot.is_connected()
    }
}

impl fmt::Debug for BotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotHandle")
            .field("id", &self.id)
            .field("name", &self.bot.name())
            .finish()
    }
}

impl PartialEq for BotHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BotHandle {}

impl Hash for BotHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for BotHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BotHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}
