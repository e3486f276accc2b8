//! # Event subscriber trait.
//!
//! Each subscriber registered with a [`SubscriberSet`](crate::SubscriberSet) gets:
//! - a **dedicated worker task**,
//! - a **bounded queue** (capacity via [`Subscribe::queue_capacity`]),
//! - **panic isolation** (panics become `EventKind::SubscriberPanicked`).
//!
//! A slow subscriber only affects its own queue: on overflow the event is dropped
//! for that subscriber and `EventKind::SubscriberOverflow` is published.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use taskgate::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::ItemFailed) {
//!             // bump a counter, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for runtime observability.
///
/// Events arrive in FIFO order on a worker task, never in the publisher's context.
/// Use async I/O and handle errors internally.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow/panic events. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to at least 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
