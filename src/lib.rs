//! # fleetvisor
//!
//! **Fleetvisor** manages the lifecycle of a fleet of long-lived network
//! clients ("bots") that share one Tokio runtime.
//!
//! Bots can be registered before or after the fleet starts. The manager
//! launches each one exactly once, tracks the ones still running, asks them to
//! quit on shutdown and reports when every one of them has terminated. A bot
//! that fails or panics is logged and removed without affecting its siblings.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    BotRef    │   │    BotRef    │   │    BotRef    │
//!     │ (network #1) │   │ (network #2) │   │ (network #3) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ add_bot()        ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Manager (fleet lifecycle)                                        │
//! │  - Lifecycle (state machine + start queue)                        │
//! │  - Registry (launched, not yet completed bots)                    │
//! │  - BotPool (one task per bot, optional concurrency cap)           │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │   bot task   │   │   bot task   │   │   bot task   │   │
//!     │ bot.run(id)  │   │ bot.run(id)  │   │ bot.run(id)  │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ BotLaunched      │ BotFinished      │ BotFailed       │ StateChanged
//!      │ BotRemoved       │ BotRemoved       │ BotRemoved      │ QuitRequested
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │               (capacity: ManagerConfig::bus_capacity)             │
//! └──────────────┬──────────────────────────────────┬─────────────────┘
//!                ▼                                  ▼
//!       Manager::subscribe()               subscriber listener
//!          receivers                              │
//!                                           SubscriberSet
//!                                      ┌──────────┼──────────┐
//!                                      ▼          ▼          ▼
//!                                  sub1.on    sub2.on    subN.on
//!                                  _event()   _event()   _event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! NEW ──start()──► STARTING ──► RUNNING ──stop()──► STOPPING ──(last bot done)──► TERMINATED
//!  │                  │            │                   │
//!  add_bot: queue     launch       add_bot: launch     add_bot: IllegalState
//!                     queued bots                      quit() sent to connected bots
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Fleet**         | Register, start, stop and await a fleet of bots.              | [`Manager`], [`ManagerBuilder`]             |
//! | **Bots**          | Define bots as trait objects or closures.                     | [`Bot`], [`BotRef`], [`BotFn`]              |
//! | **Subscriber API**| Hook into fleet events (logging, metrics, custom subscribers). | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for the manager and for bot runs.                | [`ManagerError`], [`BotError`]              |
//! | **Configuration** | Centralize manager settings.                                  | [`ManagerConfig`]                           |
//! | **Notices**       | Received NOTICE payload with reply routing.                   | [`Notice`], [`Outbound`]                    |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use fleetvisor::{BotContext, BotError, BotFn, BotRef, LifecycleState, Manager, ManagerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn fleetvisor::Subscribe>> = vec![Arc::new(fleetvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn fleetvisor::Subscribe>> = Vec::new();
//!
//!     let manager = Manager::builder(ManagerConfig::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     // Registered before start: queued until start() launches it.
//!     let libera: BotRef = BotFn::arc("irc.libera.chat", |ctx: BotContext| async move {
//!         ctx.quit.cancelled().await;
//!         Ok::<_, BotError>(())
//!     });
//!     manager.add_bot(libera)?;
//!     manager.start()?;
//!
//!     // Registered while running: launched immediately.
//!     manager.add_bot(BotFn::arc("irc.oftc.net", |ctx: BotContext| async move {
//!         ctx.quit.cancelled().await;
//!         Ok::<_, BotError>(())
//!     }))?;
//!
//!     manager.stop_and_wait().await?;
//!     assert_eq!(manager.state(), LifecycleState::Terminated);
//!     Ok(())
//! }
//! ```
mod bots;
mod core;
mod error;
mod events;
mod notice;
mod subscribers;

// ---- Public re-exports ----

pub use bots::{Bot, BotContext, BotFn, BotHandle, BotId, BotRef};
pub use core::{LifecycleState, Manager, ManagerBuilder, ManagerConfig};
pub use error::{BotError, ManagerError, RespondError};
pub use events::{Bus, Event, EventKind};
pub use notice::{Channel, Notice, Outbound, User, UserHostmask};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
