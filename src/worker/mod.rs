//! # Isolated workers.
//!
//! A [`Worker`] runs a unit of work outside the current task (for
//! [`ProcessWorker`], in a child OS process) and resolves with its last message
//! and exit code. [`with_worker`] turns any worker into a [`Task`](crate::Task)
//! so it composes with the queue and the combinators.

mod process;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::Task;

pub use process::ProcessWorker;

/// Result of a finished worker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerOutput {
    /// Last message the worker produced, if any.
    pub last_message: Option<String>,
    /// Exit code, when the worker kind has one and it exited normally.
    pub exit_code: Option<i32>,
}

/// Work executed in isolation from the caller.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Runs the worker to completion.
    ///
    /// Fails with [`TaskError::NotSupported`] when the environment cannot host
    /// this kind of worker.
    async fn run(&self) -> Result<WorkerOutput, TaskError>;
}

/// Wraps `worker` into a reusable task; every spawn runs the worker again.
pub fn with_worker<C, W>(worker: W) -> Task<C, WorkerOutput>
where
    C: 'static,
    W: Worker,
{
    let worker = Arc::new(worker);
    Task::from_fn(move |_ctx: C| {
        let worker = Arc::clone(&worker);
        async move { worker.run().await }
    })
}
