use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use super::builder::QueueBuilder;
use super::config::QueueConfig;
use super::context::QueueContext;
use super::core::Inner;
use super::handle::QueueHandle;
use super::item::{Item, Job};
use crate::error::{ConfigError, TaskError};
use crate::events::Bus;
use crate::tasks::Task;

/// Bounded-concurrency FIFO task queue.
///
/// At most `concurrency` items are active at once; pending items are admitted
/// in insertion order as active ones settle. Each task's outcome is delivered
/// through its own [`QueueHandle`] and never affects other items.
///
/// Dropping the queue stops it. Items already executing run to completion;
/// handles of items that never began resolve with [`TaskError::Discarded`]
/// once the stopped watchers let go of the queue state.
pub struct Queue {
    inner: Arc<Inner>,
    listener: Option<CancellationToken>,
}

impl Queue {
    /// Builds a queue without subscribers. See [`QueueBuilder::build`].
    pub fn new(cfg: QueueConfig) -> Result<Self, ConfigError> {
        QueueBuilder::new(cfg).build()
    }

    /// Returns a builder for a queue with subscribers.
    pub fn builder(cfg: QueueConfig) -> QueueBuilder {
        QueueBuilder::new(cfg)
    }

    pub(super) fn from_parts(inner: Arc<Inner>, listener: Option<CancellationToken>) -> Self {
        Self { inner, listener }
    }

    /// Appends `task` to the pending sequence and returns its completion handle.
    ///
    /// If the queue is running, the task starts once it is admitted. A panic in
    /// the task body resolves the handle with [`TaskError::Panicked`].
    pub fn enqueue<T>(&self, mut task: Task<QueueContext, T>) -> QueueHandle<T>
    where
        T: Send + 'static,
    {
        let id = self.inner.next_id();
        let (tx, rx) = oneshot::channel();

        let job: Job = Box::new(move |ctx: QueueContext| {
            async move {
                let body = async { task.spawn(ctx.clone()).await };
                let res = match AssertUnwindSafe(body).catch_unwind().await {
                    Ok(res) => res,
                    Err(panic) => Err(TaskError::from_panic(panic.as_ref())),
                };
                let failure = res.as_ref().err().map(TaskError::as_message);
                ctx.settle(failure.as_deref());
                let _ = tx.send(res);
            }
            .boxed()
        });

        self.inner.push(Arc::new(Item::new(id, job)));
        QueueHandle::new(id, rx)
    }

    /// Starts the admission loop. Idempotent.
    ///
    /// Items that have not begun executing (including those left behind by a
    /// previous [`stop`](Self::stop)) are picked up again.
    pub fn start(&self) {
        self.inner.start();
    }

    /// Stops admission. Tracked items stay in place; running bodies are not interrupted.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Discards all pending and active bookkeeping.
    ///
    /// Items that had not begun executing resolve with [`TaskError::Discarded`].
    /// Running bodies continue and can observe [`QueueContext::is_in_queue`].
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Number of tracked items (pending + active).
    pub fn len(&self) -> usize {
        let st = self.inner.state.lock();
        st.pending.len() + st.active.len()
    }

    /// Number of items waiting for admission.
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Number of admitted items that have not settled.
    pub fn active_len(&self) -> usize {
        self.inner.state.lock().active.len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True while the admission loop runs.
    pub fn is_active(&self) -> bool {
        self.inner.is_running()
    }

    /// Configuration this queue was built with.
    pub fn config(&self) -> &QueueConfig {
        &self.inner.cfg
    }

    /// The queue's event bus, for ad hoc receivers.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.inner.stop();
        if let Some(token) = &self.listener {
            token.cancel();
        }
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("concurrency", &self.inner.cfg.concurrency)
            .field("pending", &self.pending_len())
            .field("active", &self.active_len())
            .field("running", &self.is_active())
            .finish()
    }
}
