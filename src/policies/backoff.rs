//! # Backoff policy for retried tasks.
//!
//! [`BackoffPolicy`] decides how long [`with_retries`](crate::with_retries) sleeps
//! between a failed attempt and the next one. The delay before retry `n`
//! (0-indexed) is `first × factor^n`, clamped to `max`, then jittered.
//!
//! The base delay is a pure function of the retry index, so jitter output never
//! feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskgate::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Multiplicative growth factor (`1.0` = constant).
    pub factor: f64,
    /// Randomization applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `factor = 1.0`, `max = 30s`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Waits exactly `delay` before every retry.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Computes the delay before retry number `retry` (0-indexed).
    ///
    /// Overflowing or non-finite intermediate values clamp to [`BackoffPolicy::max`].
    pub fn next(&self, retry: u32) -> Duration {
        let exp = retry.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(first_ms: u64, max: Duration) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn exponential_growth_without_jitter() {
        let policy = exp(100, Duration::from_secs(30));
        assert_eq!(policy.next(0), Duration::from_millis(100));
        assert_eq!(policy.next(1), Duration::from_millis(200));
        assert_eq!(policy.next(2), Duration::from_millis(400));
        assert_eq!(policy.next(4), Duration::from_millis(1600));
    }

    #[test]
    fn constant_never_changes() {
        let policy = BackoffPolicy::constant(Duration::from_millis(25));
        for retry in 0..10 {
            assert_eq!(policy.next(retry), Duration::from_millis(25));
        }
    }

    #[test]
    fn first_above_max_is_clamped() {
        let policy = exp(10_000, Duration::from_secs(5));
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn overflow_clamps_to_max() {
        let policy = exp(100, Duration::from_secs(10));
        assert_eq!(policy.next(100), Duration::from_secs(10));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn decorrelated_jitter_scales_with_retry_delay() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Decorrelated,
            ..exp(100, Duration::from_millis(1000))
        };
        for retry in 0..6u32 {
            let base = Duration::from_millis(100 * 2u64.pow(retry)).min(policy.max);
            let upper = (base * 3).min(policy.max);
            for _ in 0..20 {
                let delay = policy.next(retry);
                assert!(delay >= policy.first, "retry {retry}: {delay:?}");
                assert!(delay <= upper, "retry {retry}: {delay:?} > {upper:?}");
            }
        }
    }

    #[test]
    fn equal_jitter_keeps_half() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Equal,
            ..BackoffPolicy::constant(Duration::from_millis(1000))
        };
        for retry in 0..50 {
            let delay = policy.next(retry);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1000));
        }
    }
}
