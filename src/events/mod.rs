//! Manager events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the manager, its launch path and the
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast` that stamps sequence numbers
//!
//! ## Quick reference
//! - **Publishers**: `Manager` (state changes, queueing, quit requests, waiting),
//!   `core::runner` (launch and completion), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the manager's subscriber listener (fans out to `SubscriberSet`)
//!   and any receiver obtained through [`Manager::subscribe`](crate::Manager::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
