//! # Runtime events emitted by the queue and the retry combinator.
//!
//! [`EventKind`] classifies events into three groups:
//! - **Queue events**: admission loop state and per-item lifecycle
//! - **Retry events**: failed attempts and scheduled retries
//! - **Subscriber events**: overflow/panic inside a subscriber worker
//!
//! [`Event`] carries a global sequence number, a timestamp and optional metadata.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskgate::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_attempt(2)
//!     .with_delay(Duration::from_millis(50))
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.delay_ms, Some(50));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Queue events ===
    /// The admission loop started.
    QueueStarted,

    /// The admission loop stopped; tracked items stopped waiting for readiness.
    ///
    /// Sets:
    /// - `pending`, `active`: bookkeeping sizes at stop time
    QueueStopped,

    /// Pending and active bookkeeping was discarded.
    ///
    /// Sets:
    /// - `pending`, `active`: sizes that were discarded
    QueueCleared,

    /// An item was appended to the pending sequence.
    ///
    /// Sets:
    /// - `item`: item id
    ItemQueued,

    /// An item was promoted from pending to active.
    ///
    /// Sets:
    /// - `item`: item id
    ItemAdmitted,

    /// An item confirmed readiness and began executing its task body.
    ///
    /// Sets:
    /// - `item`: item id
    ItemStarted,

    /// An item's task body succeeded.
    ///
    /// Sets:
    /// - `item`: item id
    ItemCompleted,

    /// An item's task body failed.
    ///
    /// Sets:
    /// - `item`: item id
    /// - `reason`: error message
    ItemFailed,

    /// An item was dropped by `clear()` before it began executing.
    ///
    /// Sets:
    /// - `item`: item id
    ItemDiscarded,

    // === Retry events ===
    /// One attempt of a retried task failed.
    ///
    /// Sets:
    /// - `attempt`: attempt number (1-based)
    /// - `reason`: error message
    AttemptFailed,

    /// A retry was scheduled after a failed attempt.
    ///
    /// Sets:
    /// - `attempt`: the attempt that failed
    /// - `delay_ms`: wait before the next attempt
    /// - `reason`: error message
    RetryScheduled,

    /// Every attempt failed; the retry combinator gave up.
    ///
    /// Sets:
    /// - `attempt`: total attempts made
    RetriesExhausted,

    // === Subscriber events ===
    /// A subscriber panicked while handling an event.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,

    /// A subscriber's queue was full or closed; the event was dropped for it.
    ///
    /// Sets:
    /// - `reason`: subscriber name and cause
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Queue item id, if applicable.
    pub item: Option<u64>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u32>,
    /// Delay before the next attempt in milliseconds.
    pub delay_ms: Option<u32>,
    /// Pending bookkeeping size.
    pub pending: Option<usize>,
    /// Active bookkeeping size.
    pub active: Option<usize>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event with the current timestamp and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            item: None,
            attempt: None,
            delay_ms: None,
            pending: None,
            active: None,
            reason: None,
        }
    }

    /// Attaches a queue item id.
    #[inline]
    pub fn with_item(mut self, id: u64) -> Self {
        self.item = Some(id);
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    /// Attaches bookkeeping sizes.
    #[inline]
    pub fn with_counts(mut self, pending: usize, active: usize) -> Self {
        self.pending = Some(pending);
        self.active = Some(active);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    /// True for events emitted by subscriber workers themselves.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}
