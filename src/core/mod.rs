//! Runtime core: fleet lifecycle and bot execution.
//!
//! The public API from this module is [`Manager`] (built with [`ManagerBuilder`]
//! from a [`ManagerConfig`]) and the [`LifecycleState`] it reports.
//!
//! Internal modules:
//! - [`lifecycle`]: state machine and start queue;
//! - [`registry`]: launched-but-not-completed bots behind one lock;
//! - [`pool`]: task pool with optional concurrency cap and executor-style close;
//! - [`runner`]: launches one bot and runs its completion hook;
//! - [`manager`]: registration, start, stop and wait;
//! - [`shutdown`]: cross-platform termination signal handling.

mod builder;
mod config;
mod lifecycle;
mod manager;
mod pool;
mod registry;
mod runner;
mod shutdown;

pub use builder::ManagerBuilder;
pub use config::ManagerConfig;
pub use lifecycle::LifecycleState;
pub use manager::Manager;
