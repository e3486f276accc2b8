//! Retry delay policies.
//!
//! These knobs control **how long** [`with_retries`](crate::with_retries) waits
//! between a failed attempt and the next one.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! RetryOptions { max_retries, backoff: Option<BackoffPolicy> }
//!      └─► with_retries uses backoff.next(retry_index) before each retry
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=100ms, factor=1.0 (constant), max=30s, jitter=None.
//! - `BackoffPolicy::constant(d)` → exactly `d` before every retry (`waitBeforeRetry`).

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
