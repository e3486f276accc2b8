//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: [`Queue`](crate::Queue) (admission loop, item watchers),
//!   [`with_retries`](crate::with_retries) when given a bus, `SubscriberSet` workers.
//! - **Consumers**: the queue's listener, which fans out to its `SubscriberSet`,
//!   or any receiver obtained from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
