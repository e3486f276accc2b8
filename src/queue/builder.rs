use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::config::QueueConfig;
use super::core::Inner;
use super::queue::Queue;
use crate::error::ConfigError;
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for a [`Queue`] with optional event subscribers.
pub struct QueueBuilder {
    cfg: QueueConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl QueueBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(cfg: QueueConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers (logging, metrics, ...).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Validates the configuration and builds the queue.
    ///
    /// Starts the admission loop when `auto_start` is set. Requires a Tokio
    /// runtime when subscribers are given or the queue auto-starts.
    pub fn build(self) -> Result<Queue, ConfigError> {
        self.cfg.validate()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = (!self.subscribers.is_empty()).then(|| {
            let token = CancellationToken::new();
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(&bus, set, token.clone());
            token
        });

        let auto_start = self.cfg.auto_start;
        let queue = Queue::from_parts(Arc::new(Inner::new(self.cfg, bus)), listener);
        if auto_start {
            queue.start();
        }
        Ok(queue)
    }
}

/// Forwards bus events to the subscriber set until the queue is dropped.
fn subscriber_listener(bus: &Bus, set: SubscriberSet, token: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        }
        // Forward what was published before the drop.
        while let Ok(ev) = rx.try_recv() {
            set.emit(&ev);
        }
        set.shutdown().await;
    });
}
