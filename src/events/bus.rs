//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`]: publishing never blocks, every
//! receiver gets a clone of each event sent after it subscribed.
//!
//! ```text
//! Publishers (many):                     Subscribers:
//!   admission loop ──┐
//!   item watchers  ──┼──► Bus ──► queue listener ──► SubscriberSet
//!   with_retries   ──┘         └► Bus::subscribe() (ad hoc receivers)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: events sent with no receivers are dropped.
//! - **Bounded capacity**: slow receivers observe `RecvError::Lagged(n)`.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus; capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_see_events_after_subscribing() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::QueueStarted));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::QueueStopped));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::QueueStopped);
        assert!(rx.try_recv().is_err());
    }
}
