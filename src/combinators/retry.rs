//! # Retry a task factory until it succeeds or the budget runs out.
//!
//! ```text
//! loop {
//!   ├─► attempt += 1
//!   ├─► factory() ── fresh future ──► await
//!   │       ├─ Ok  ──► return value (ledger dropped)
//!   │       └─ Err ──► ledger.push({ error, elapsed }), publish AttemptFailed
//!   │                  ├─ retries exhausted ─► publish RetriesExhausted
//!   │                  │                       return MaximumTriesReached{ ledger }
//!   │                  └─ delay = backoff.next(retry)
//!   │                     publish RetryScheduled, sleep(delay)
//! }
//! ```
//!
//! ## Rules
//! - Total attempts = `max_retries + 1`.
//! - Every attempt calls the factory again; an operation that is already
//!   underway cannot be retried, so only factories are accepted.
//! - Events are published only when a bus is attached.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::error::{FailedAttempt, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;

/// Options of [`with_retries`].
///
/// `From<u32>` sets only `max_retries`, so `with_retries(f, 3)` works.
#[derive(Clone, Debug, Default)]
pub struct RetryOptions {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay policy between attempts (`None` = retry immediately).
    pub backoff: Option<BackoffPolicy>,
    /// Optional bus for retry events.
    pub bus: Option<Bus>,
}

impl RetryOptions {
    /// Options with `max_retries` and no delay.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Waits exactly `delay` before every retry.
    pub fn wait_before_retry(mut self, delay: Duration) -> Self {
        self.backoff = Some(BackoffPolicy::constant(delay));
        self
    }

    /// Uses `policy` for the delay before every retry.
    pub fn with_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = Some(policy);
        self
    }

    /// Publishes `AttemptFailed`/`RetryScheduled`/`RetriesExhausted` to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// `max_retries + 1`.
    pub fn total_attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }

    fn delay_for(&self, retry: u64) -> Duration {
        self.backoff
            .map(|b| b.next(u32::try_from(retry).unwrap_or(u32::MAX)))
            .unwrap_or(Duration::ZERO)
    }

    fn publish(&self, ev: impl FnOnce() -> Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev());
        }
    }
}

impl From<u32> for RetryOptions {
    fn from(max_retries: u32) -> Self {
        Self::new(max_retries)
    }
}

/// Calls `factory` until one attempt succeeds or `max_retries + 1` attempts failed.
///
/// On exhaustion fails with [`TaskError::MaximumTriesReached`] carrying every
/// failed attempt in order.
///
/// # Example
/// ```rust
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
/// use taskgate::{RetryOptions, TaskError, with_retries};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let calls = AtomicU32::new(0);
/// let value = with_retries(
///     || {
///         let n = calls.fetch_add(1, Ordering::SeqCst);
///         async move {
///             if n < 2 { Err(TaskError::fail("flaky")) } else { Ok("connected") }
///         }
///     },
///     RetryOptions::new(3).wait_before_retry(Duration::from_millis(1)),
/// )
/// .await
/// .unwrap();
///
/// assert_eq!(value, "connected");
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # }
/// ```
pub async fn with_retries<F, Fut, T>(
    mut factory: F,
    opts: impl Into<RetryOptions>,
) -> Result<T, TaskError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TaskError>>,
{
    let opts = opts.into();
    let mut errors = Vec::new();
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        let started = Instant::now();

        let error = match factory().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        let elapsed = started.elapsed();
        let label = u32::try_from(attempt).unwrap_or(u32::MAX);

        opts.publish(|| {
            Event::new(EventKind::AttemptFailed)
                .with_attempt(label)
                .with_reason(error.to_string())
        });

        if attempt >= opts.total_attempts() {
            errors.push(FailedAttempt { error, elapsed });
            opts.publish(|| Event::new(EventKind::RetriesExhausted).with_attempt(label));
            return Err(TaskError::MaximumTriesReached { errors });
        }

        let delay = opts.delay_for(attempt - 1);
        opts.publish(|| {
            Event::new(EventKind::RetryScheduled)
                .with_attempt(label)
                .with_delay(delay)
                .with_reason(error.to_string())
        });
        errors.push(FailedAttempt { error, elapsed });

        if !delay.is_zero() {
            time::sleep(delay).await;
        }
    }
}
