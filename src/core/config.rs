//! # Manager configuration.
//!
//! Provides [`ManagerConfig`] centralized settings for one fleet manager.
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (elastic pool, no semaphore created)
//! - `bus_capacity` is clamped to a minimum of 1
//! - `poll_interval` is clamped to a minimum of 1ms

use std::time::Duration;

/// Configuration for a fleet [`Manager`](crate::Manager).
///
/// ## Field semantics
/// - `max_concurrent`: Bots allowed to run at once (`0` = unlimited)
/// - `poll_interval`: How often `stop_and_wait` reports outstanding bots
/// - `bus_capacity`: Event bus ring buffer size
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Maximum number of bots running concurrently.
    ///
    /// - `0` = unlimited (every launched bot runs immediately)
    /// - `n > 0` = further bots wait for a free slot; a bot still waiting when
    ///   the pool closes is never run
    pub max_concurrent: usize,

    /// Interval between progress reports while waiting for termination.
    pub poll_interval: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl ManagerConfig {
    /// Returns the concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` concurrent bots
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the poll interval clamped to a minimum of 1ms.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }
}

impl Default for ManagerConfig {
    /// Default configuration:
    ///
    /// - `max_concurrent = 0` (unlimited)
    /// - `poll_interval = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            poll_interval: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_map_to_helpers() {
        let mut cfg = ManagerConfig::default();
        assert_eq!(cfg.concurrency_limit(), None);
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));

        cfg.max_concurrent = 3;
        cfg.bus_capacity = 0;
        cfg.poll_interval = Duration::ZERO;
        assert_eq!(cfg.concurrency_limit(), Some(3));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.poll_interval_clamped(), Duration::from_millis(1));
    }
}
