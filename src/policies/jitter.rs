//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] randomizes backoff delays so that many callers retrying the
//! same dependency do not wake up in lockstep.
//!
//! - [`JitterPolicy::None`]: exact delay
//! - [`JitterPolicy::Full`]: uniform in `[0, delay]`
//! - [`JitterPolicy::Equal`]: `delay/2 + uniform[0, delay/2]`
//! - [`JitterPolicy::Decorrelated`]: uniform in `[first, delay × 3]`, capped at `max`

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    #[default]
    None,
    /// Random delay in `[0, delay]`.
    Full,
    /// `delay/2 + random[0, delay/2]`; keeps roughly 75% of the delay on average.
    Equal,
    /// Random delay in `[base, delay × 3]`, capped at `max`, where `delay` is the
    /// un-jittered backoff delay of the current retry.
    ///
    /// Needs context, see [`apply_decorrelated`](Self::apply_decorrelated).
    Decorrelated,
}

impl JitterPolicy {
    /// Applies jitter to `delay`.
    ///
    /// `Decorrelated` returns `delay` unchanged here.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full => {
                let ms = millis(delay);
                if ms == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rand::rng().random_range(0..=ms))
            }
            JitterPolicy::Equal => {
                let half = millis(delay) / 2;
                if half == 0 {
                    return delay;
                }
                Duration::from_millis(half + rand::rng().random_range(0..=half))
            }
        }
    }

    /// Applies decorrelated jitter given the floor, the un-jittered delay of the
    /// current retry and the cap.
    ///
    /// Any other policy falls back to `apply(delay)`.
    pub fn apply_decorrelated(&self, base: Duration, delay: Duration, max: Duration) -> Duration {
        if !matches!(self, JitterPolicy::Decorrelated) {
            return self.apply(delay);
        }
        let base_ms = millis(base);
        let upper = millis(delay).saturating_mul(3).min(millis(max)).max(base_ms);
        if base_ms >= upper {
            return base;
        }
        Duration::from_millis(rand::rng().random_range(base_ms..=upper))
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let d = Duration::from_millis(250);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn full_stays_within_delay() {
        for _ in 0..100 {
            assert!(JitterPolicy::Full.apply(Duration::from_millis(40)) <= Duration::from_millis(40));
        }
        assert_eq!(JitterPolicy::Full.apply(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn decorrelated_respects_floor_and_cap() {
        let base = Duration::from_millis(10);
        let max = Duration::from_millis(50);
        for _ in 0..100 {
            let d = JitterPolicy::Decorrelated.apply_decorrelated(base, Duration::from_millis(40), max);
            assert!(d >= base && d <= max, "{d:?}");
        }
    }
}
