//! Queue items.
//!
//! An [`Item`] owns the type-erased job built at enqueue time. Taking the job out
//! of the item is the single "begin execution" point: whoever takes it (a
//! readiness watcher) runs it, and an item whose job was taken can no longer be
//! discarded by `clear()`.

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::context::QueueContext;

/// Type-erased task body plus its completion channel.
pub(super) type Job = Box<dyn FnOnce(QueueContext) -> BoxFuture<'static, ()> + Send>;

/// One enqueued task. Shared between the queue state and its readiness watcher.
pub(super) struct Item {
    id: u64,
    job: Mutex<Option<Job>>,
    /// Woken on promotion and on `clear()`.
    ready: Notify,
}

impl Item {
    pub(super) fn new(id: u64, job: Job) -> Self {
        Self {
            id,
            job: Mutex::new(Some(job)),
            ready: Notify::new(),
        }
    }

    pub(super) fn id(&self) -> u64 {
        self.id
    }

    /// Takes the job; `None` once execution began or the item was discarded.
    pub(super) fn take_job(&self) -> Option<Job> {
        self.job.lock().take()
    }

    /// True until the job is taken.
    pub(super) fn is_unstarted(&self) -> bool {
        self.job.lock().is_some()
    }

    pub(super) fn wake(&self) {
        self.ready.notify_one();
    }

    pub(super) async fn woken(&self) {
        self.ready.notified().await;
    }
}

/// Outcome of one readiness check.
pub(super) enum Readiness {
    /// Still pending; check again later.
    Wait,
    /// Promoted and confirmed; run this job.
    Go(Job),
    /// Untracked, already taken, or the queue stopped: stop watching.
    Abandon,
}
