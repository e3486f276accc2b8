//! Read-only view of the queue handed to a running task body.

use std::fmt;
use std::sync::Weak;

use super::core::Inner;

/// Context passed to every task enqueued on a [`Queue`](crate::Queue).
///
/// Long-running bodies can poll [`is_queue_active`](Self::is_queue_active) or
/// [`is_in_queue`](Self::is_in_queue) to notice an external `stop()`/`clear()`
/// and exit cooperatively. The queue never interrupts a running body itself.
#[derive(Clone)]
pub struct QueueContext {
    id: u64,
    queue: Weak<Inner>,
}

impl QueueContext {
    pub(super) fn new(id: u64, queue: Weak<Inner>) -> Self {
        Self { id, queue }
    }

    /// Id of the item this body belongs to (same as [`QueueHandle::id`](crate::QueueHandle::id)).
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True while the item is still tracked (pending or active) by the queue.
    ///
    /// Becomes false after `clear()` or once the queue is dropped.
    pub fn is_in_queue(&self) -> bool {
        self.queue
            .upgrade()
            .is_some_and(|q| q.contains(self.id))
    }

    /// True while the queue's admission loop runs.
    pub fn is_queue_active(&self) -> bool {
        self.queue.upgrade().is_some_and(|q| q.is_running())
    }

    /// Removes the item from the active set; called once when the body settles.
    pub(super) fn settle(&self, failure: Option<&str>) {
        if let Some(q) = self.queue.upgrade() {
            q.settle(self.id, failure);
        }
    }
}

impl fmt::Debug for QueueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueContext")
            .field("id", &self.id)
            .field("in_queue", &self.is_in_queue())
            .field("queue_active", &self.is_queue_active())
            .finish()
    }
}
