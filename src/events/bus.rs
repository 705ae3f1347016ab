//! # Event bus for broadcasting manager events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (manager calls, bot tasks).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Subscribers:
//!   Manager   ──┐
//!   Bot task 1 ─┼──────► Bus ───────► subscriber listener ────► SubscriberSet
//!   Bot task N ─┤  (broadcast chan)  └─► Manager::subscribe() receivers
//!   Workers   ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Per-bus sequence**: every published event gets a unique sequence number from
//!   *this* bus, so two managers never share a counter. Concurrent publishers may
//!   enqueue events slightly out of `seq` order; sort by `seq` to restore it.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for manager events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: clones share the sender and the sequence counter.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    seq: Arc<AtomicU64>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self {
            tx,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Stamps the event with the next sequence number and publishes it.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, mut ev: Event) {
        ev.seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn sequence_numbers_are_per_bus() {
        let a = Bus::new(8);
        let b = Bus::new(8);
        let mut ra = a.subscribe();
        let mut rb = b.subscribe();

        a.publish(Event::new(EventKind::BotQueued));
        a.publish(Event::new(EventKind::BotQueued));
        b.publish(Event::new(EventKind::BotQueued));

        assert_eq!(ra.recv().await.unwrap().seq, 0);
        assert_eq!(ra.recv().await.unwrap().seq, 1);
        assert_eq!(rb.recv().await.unwrap().seq, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_publishers_get_unique_contiguous_seqs() {
        let bus = Bus::new(1024);
        let mut rx = bus.subscribe();

        let publishers: Vec<_> = (0..4)
            .map(|_| {
                let bus = bus.clone();
                tokio::spawn(async move {
                    for _ in 0..100 {
                        bus.publish(Event::new(EventKind::BotLaunched));
                    }
                })
            })
            .collect();
        for p in publishers {
            p.await.unwrap();
        }

        let mut seqs = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            seqs.push(ev.seq);
        }
        seqs.sort_unstable();
        assert_eq!(seqs, (0..400).collect::<Vec<u64>>());
    }

    #[test]
    fn publish_without_receivers_is_a_no_op() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::ShutdownRequested));
    }
}
