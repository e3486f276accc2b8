//! # Event subscribers.
//!
//! [`Subscribe`] is the extension point for observing queue and retry events;
//! [`SubscriberSet`] delivers each event to every subscriber through its own
//! bounded queue and worker task.
//!
//! ```text
//!   Queue ── publish(Event) ──► Bus ──► queue listener ──► SubscriberSet::emit
//!                                                              │
//!                                                   ┌──────────┼──────────┐
//!                                                   ▼          ▼          ▼
//!                                               LogWriter   Metrics    Custom
//! ```

mod set;
mod subscriber;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
