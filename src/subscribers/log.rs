//! # LogWriter: reference event printer
//!
//! Prints one line per [`Event`] to stdout. Meant for demos and debugging.
//!
//! ## Example output
//! ```text
//! [queue-started]
//! [queued] item=3
//! [admitted] item=3
//! [started] item=3
//! [failed] item=3 err="execution failed: boom"
//! [retry] attempt=1 delay_ms=100 err="execution failed: boom"
//! [queue-stopped] pending=2 active=0
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn id(ev: &Event) -> String {
    ev.item.map(|i| i.to_string()).unwrap_or_else(|| "?".into())
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::QueueStarted => println!("[queue-started]"),
            EventKind::QueueStopped => println!(
                "[queue-stopped] pending={:?} active={:?}",
                e.pending, e.active
            ),
            EventKind::QueueCleared => println!(
                "[queue-cleared] pending={:?} active={:?}",
                e.pending, e.active
            ),
            EventKind::ItemQueued => println!("[queued] item={}", id(e)),
            EventKind::ItemAdmitted => println!("[admitted] item={}", id(e)),
            EventKind::ItemStarted => println!("[started] item={}", id(e)),
            EventKind::ItemCompleted => println!("[completed] item={}", id(e)),
            EventKind::ItemFailed => println!("[failed] item={} err={reason:?}", id(e)),
            EventKind::ItemDiscarded => println!("[discarded] item={}", id(e)),
            EventKind::AttemptFailed => {
                println!("[attempt-failed] attempt={:?} err={reason:?}", e.attempt)
            }
            EventKind::RetryScheduled => println!(
                "[retry] attempt={:?} delay_ms={:?} err={reason:?}",
                e.attempt, e.delay_ms
            ),
            EventKind::RetriesExhausted => println!("[retries-exhausted] attempts={:?}", e.attempt),
            EventKind::SubscriberOverflow => println!("[subscriber-overflow] {reason}"),
            EventKind::SubscriberPanicked => println!("[subscriber-panicked] {reason}"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
