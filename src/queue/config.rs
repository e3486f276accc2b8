//! # Queue configuration.
//!
//! [`QueueConfig`] holds the construction-time settings of one [`Queue`](crate::Queue).
//! Defaults are constants; every queue owns its own copy.
//!
//! | field                   | constraint | default |
//! |-------------------------|------------|---------|
//! | `concurrency`           | `>= 1`     | 1       |
//! | `auto_start`            |            | true    |
//! | `action_interval`       | `>= 1ms`   | 100ms   |
//! | `next_actions_interval` | `>= 1ms`   | 100ms   |
//! | `bus_capacity`          | clamped to `>= 1` | 1024 |

use std::time::Duration;

use crate::error::ConfigError;

/// Default maximum number of simultaneously active items.
pub const DEFAULT_CONCURRENCY: usize = 1;
/// Default for starting the admission loop on construction.
pub const DEFAULT_AUTO_START: bool = true;
/// Default per-item readiness re-check period.
pub const DEFAULT_ACTION_INTERVAL: Duration = Duration::from_millis(100);
/// Default admission loop tick period.
pub const DEFAULT_NEXT_ACTIONS_INTERVAL: Duration = Duration::from_millis(100);
/// Default event bus capacity.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Configuration of a [`Queue`](crate::Queue).
///
/// ## Field semantics
/// - `concurrency`: max items in the active set at once
/// - `auto_start`: start the admission loop in `build()`
/// - `action_interval`: how often a promoted-but-not-started item re-checks
///   that it is still tracked and active (it is also woken on promotion)
/// - `next_actions_interval`: admission loop tick (the loop is also woken by
///   `enqueue` and by item settlement)
/// - `bus_capacity`: ring buffer size of the queue's event bus
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Maximum number of simultaneously active items.
    pub concurrency: usize,
    /// Start the admission loop on construction.
    pub auto_start: bool,
    /// Per-item readiness re-check period.
    pub action_interval: Duration,
    /// Admission loop tick period.
    pub next_actions_interval: Duration,
    /// Capacity of the event bus.
    pub bus_capacity: usize,
}

impl QueueConfig {
    /// Default config with the given concurrency.
    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }

    /// Checks every constraint; called eagerly by the queue builder.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency < 1 {
            return Err(ConfigError::InvalidConcurrency(self.concurrency));
        }
        for (name, value) in [
            ("action_interval", self.action_interval),
            ("next_actions_interval", self.next_actions_interval),
        ] {
            if value < Duration::from_millis(1) {
                return Err(ConfigError::InvalidInterval { name, value });
            }
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            auto_start: DEFAULT_AUTO_START,
            action_interval: DEFAULT_ACTION_INTERVAL,
            next_actions_interval: DEFAULT_NEXT_ACTIONS_INTERVAL,
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = QueueConfig::default();
        assert_eq!(cfg.concurrency, 1);
        assert!(cfg.auto_start);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cfg = QueueConfig::with_concurrency(0);
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidConcurrency(0)));
    }

    #[test]
    fn sub_millisecond_intervals_are_rejected() {
        let cfg = QueueConfig {
            next_actions_interval: Duration::from_micros(500),
            ..QueueConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidInterval {
                name: "next_actions_interval",
                value: Duration::from_micros(500),
            })
        );

        let cfg = QueueConfig {
            action_interval: Duration::ZERO,
            ..QueueConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidInterval { name: "action_interval", .. })
        ));
    }
}
