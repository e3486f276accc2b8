//! # Task adapter.
//!
//! [`Task<C, T>`] normalizes the supported task shapes into one interface:
//! [`Task::spawn`] takes the combinator's context `C` and always returns a
//! [`BoxTaskFuture<T>`].
//!
//! | Constructor            | Shape                                   | Reusable |
//! |------------------------|-----------------------------------------|----------|
//! | [`Task::sync`]         | `FnMut(C) -> Result<T, TaskError>`      | yes      |
//! | [`Task::from_fn`]      | `FnMut(C) -> impl Future<Output = ..>`  | yes      |
//! | [`Task::from_future`]  | an operation that is already underway   | no       |
//!
//! A started operation can be observed once. Spawning it again yields a future
//! that fails with [`TaskError::InvalidTask`].
//!
//! ## Example
//! ```rust
//! use taskgate::{Task, TaskError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut double: Task<u32, u32> = Task::sync(|n| Ok(n * 2));
//! assert_eq!(double.spawn(21).await.unwrap(), 42);
//!
//! let mut once: Task<(), &str> = Task::from_future(async { Ok::<_, TaskError>("done") });
//! assert_eq!(once.spawn(()).await.unwrap(), "done");
//! assert!(matches!(once.spawn(()).await, Err(TaskError::InvalidTask { .. })));
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, TaskError>> + Send + 'static>>;

type SyncFn<C, T> = Box<dyn FnMut(C) -> Result<T, TaskError> + Send>;
type AsyncFn<C, T> = Box<dyn FnMut(C) -> BoxTaskFuture<T> + Send>;

/// Shape a [`Task`] was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    /// Synchronous callable.
    Sync,
    /// Callable returning a future.
    Async,
    /// Already-started operation.
    Started,
}

enum Repr<C, T> {
    Sync(SyncFn<C, T>),
    Async(AsyncFn<C, T>),
    Started(Option<BoxTaskFuture<T>>),
}

/// A unit of deferred, possibly failing, asynchronous work.
///
/// `C` is the context the running combinator passes in (e.g.
/// [`QueueContext`](crate::QueueContext)); `T` is the success value.
pub struct Task<C, T> {
    repr: Repr<C, T>,
}

impl<C: 'static, T: Send + 'static> Task<C, T> {
    /// Wraps a synchronous callable. It runs when the returned future is created.
    pub fn sync<F>(f: F) -> Self
    where
        F: FnMut(C) -> Result<T, TaskError> + Send + 'static,
    {
        Self {
            repr: Repr::Sync(Box::new(f)),
        }
    }

    /// Wraps a callable that creates a fresh future per invocation.
    pub fn from_fn<F, Fut>(mut f: F) -> Self
    where
        F: FnMut(C) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Self {
            repr: Repr::Async(Box::new(move |ctx| Box::pin(f(ctx)))),
        }
    }

    /// Wraps an operation that is already underway. The context is ignored.
    pub fn from_future<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Self {
            repr: Repr::Started(Some(Box::pin(fut))),
        }
    }

    /// Starts one execution and returns its completion future.
    pub fn spawn(&mut self, ctx: C) -> BoxTaskFuture<T> {
        match &mut self.repr {
            Repr::Sync(f) => Box::pin(futures::future::ready(f(ctx))),
            Repr::Async(f) => f(ctx),
            Repr::Started(slot) => match slot.take() {
                Some(fut) => fut,
                None => Box::pin(futures::future::ready(Err(TaskError::InvalidTask {
                    reason: "already-started operation was observed before".to_string(),
                }))),
            },
        }
    }
}

impl<C, T> Task<C, T> {
    /// Returns the shape this task was built from.
    pub fn kind(&self) -> TaskKind {
        match self.repr {
            Repr::Sync(_) => TaskKind::Sync,
            Repr::Async(_) => TaskKind::Async,
            Repr::Started(_) => TaskKind::Started,
        }
    }

    /// True if every [`spawn`](Task::spawn) starts a fresh execution.
    pub fn is_reusable(&self) -> bool {
        !matches!(self.repr, Repr::Started(_))
    }
}

impl<C, T> fmt::Debug for Task<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("kind", &self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn sync_runs_on_every_spawn() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let mut task: Task<(), usize> = Task::sync(move |()| Ok(c.fetch_add(1, Ordering::SeqCst)));

        assert_eq!(task.kind(), TaskKind::Sync);
        assert_eq!(task.spawn(()).await.unwrap(), 0);
        assert_eq!(task.spawn(()).await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn async_factory_receives_context() {
        let mut task: Task<String, usize> = Task::from_fn(|s: String| async move { Ok(s.len()) });
        assert!(task.is_reusable());
        assert_eq!(task.spawn("abc".into()).await.unwrap(), 3);
        assert_eq!(task.spawn("abcd".into()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn started_operation_is_observed_once() {
        let mut task: Task<(), u8> = Task::from_future(async { Err(TaskError::fail("nope")) });
        assert!(!task.is_reusable());

        let first = task.spawn(()).await.unwrap_err();
        assert_eq!(first.as_label(), "task_failed");
        let second = task.spawn(()).await.unwrap_err();
        assert_eq!(second.as_label(), "task_invalid");
    }
}
