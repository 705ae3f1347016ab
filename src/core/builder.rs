use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_util::sync::CancellationToken;

use crate::core::ManagerConfig;
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::{manager::Manager, manager::Shared, pool::BotPool};

/// Builder for constructing a [`Manager`] with optional features.
pub struct ManagerBuilder {
    cfg: ManagerConfig,
    number: u64,
    runtime: Option<Handle>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ManagerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: ManagerConfig) -> Self {
        Self {
            cfg,
            number: 0,
            runtime: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the manager number used to label bot tasks in logs.
    pub fn with_number(mut self, number: u64) -> Self {
        self.number = number;
        self
    }

    /// Runs bot tasks and subscriber workers on `runtime` instead of the
    /// runtime current at [`build`](Self::build) time.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive manager events (state changes, bot launches and
    /// failures, shutdown progress) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the manager in the `NEW` state.
    ///
    /// Initializes the event bus, the bot pool and, when subscribers were
    /// given, their workers plus the listener forwarding bus events to them.
    ///
    /// # Panics
    /// Without [`with_runtime`](Self::with_runtime), panics if called outside a
    /// Tokio runtime.
    pub fn build(self) -> Manager {
        let runtime = self.runtime.unwrap_or_else(Handle::current);
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = CancellationToken::new();

        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone(), &runtime);
            subscriber_listener(&runtime, &bus, subs, listener.clone());
        }

        let pool = BotPool::new(runtime, self.cfg.concurrency_limit());
        let shared = Arc::new(Shared::new(self.number, bus));
        Manager::new_internal(self.cfg, shared, pool, listener)
    }
}

/// Forwards bus events to the subscriber set until `stop` fires, then
/// delivers what is already buffered and lets the workers drain.
fn subscriber_listener(
    runtime: &Handle,
    bus: &Bus,
    subs: SubscriberSet,
    stop: CancellationToken,
) {
    let mut rx = bus.subscribe();
    runtime.spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "subscriber listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => break,
            }
        }
        loop {
            match rx.try_recv() {
                Ok(ev) => subs.emit(&ev),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        subs.shutdown().await;
    });
}
