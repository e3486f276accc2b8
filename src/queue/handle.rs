//! Caller-facing handle of one enqueued task.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::TaskError;

/// Resolves with the result of an enqueued task.
///
/// Failures of the task body surface here and nowhere else. If the item is
/// dropped by [`Queue::clear`](crate::Queue::clear) before it began executing,
/// the handle resolves with [`TaskError::Discarded`]. The same happens when the
/// [`Queue`](crate::Queue) is dropped first: its unstarted items are released
/// together with the queue state. After [`Queue::stop`](crate::Queue::stop) an
/// unstarted item stays pending until the queue is started again.
#[must_use = "the handle is the only way to observe the task's result"]
#[derive(Debug)]
pub struct QueueHandle<T> {
    id: u64,
    rx: oneshot::Receiver<Result<T, TaskError>>,
}

impl<T> QueueHandle<T> {
    pub(super) fn new(id: u64, rx: oneshot::Receiver<Result<T, TaskError>>) -> Self {
        Self { id, rx }
    }

    /// Item id, also visible to the body through [`QueueContext::id`](crate::QueueContext::id).
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> Future for QueueHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(TaskError::Discarded)))
    }
}
