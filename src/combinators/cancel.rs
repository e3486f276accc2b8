//! # Cancellable task wrapper.
//!
//! ```text
//! with_cancellation(task) ──► spawn body(CancelContext) ──► Cancelable<T>
//!                                                              │
//!      Canceler::cancel() ──► phase Running → Canceled ────────┤ Err(Canceled)
//!      body settles       ──► phase Running → Finished ────────┘ body result
//! ```
//!
//! ## Rules
//! - The phase leaves `Running` exactly once; whichever side moves it decides the outcome.
//! - Cancellation only flips the token. The body keeps running until it observes
//!   [`CancelContext::is_cancellation_requested`] and returns; its value is discarded.
//! - `cancel()` after the body settled changes nothing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::Task;

enum Phase {
    Running,
    Finished,
    Canceled(Option<String>),
}

struct Shared {
    phase: Mutex<Phase>,
    token: CancellationToken,
}

impl Shared {
    /// Running → Canceled. Returns false if the phase already moved.
    fn cancel(&self, reason: Option<String>) -> bool {
        {
            let mut phase = self.phase.lock();
            if !matches!(*phase, Phase::Running) {
                return false;
            }
            *phase = Phase::Canceled(reason);
        }
        self.token.cancel();
        true
    }

    /// Running → Finished. Returns false if cancellation won.
    fn finish(&self) -> bool {
        let mut phase = self.phase.lock();
        match *phase {
            Phase::Running => {
                *phase = Phase::Finished;
                true
            }
            Phase::Finished => true,
            Phase::Canceled(_) => false,
        }
    }

    fn canceled_error(&self) -> TaskError {
        let reason = match &*self.phase.lock() {
            Phase::Canceled(reason) => reason.clone(),
            _ => None,
        };
        TaskError::Canceled { reason }
    }

    fn is_canceled(&self) -> bool {
        matches!(*self.phase.lock(), Phase::Canceled(_))
    }
}

/// Read-only view of the cancellation state, handed to the task body.
#[derive(Clone, Debug)]
pub struct CancelContext {
    token: CancellationToken,
}

impl CancelContext {
    /// True once `cancel()` was called on the owning [`Cancelable`].
    pub fn is_cancellation_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when cancellation is requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// `Err(TaskError::Canceled)` once cancellation is requested, for use with `?`.
    pub fn check(&self) -> Result<(), TaskError> {
        if self.token.is_cancelled() {
            Err(TaskError::Canceled { reason: None })
        } else {
            Ok(())
        }
    }
}

/// Remote cancel handle of a [`Cancelable`]. Cheap to clone.
#[derive(Clone)]
pub struct Canceler {
    shared: Arc<Shared>,
}

impl Canceler {
    /// Requests cancellation. Returns true if this call decided the outcome.
    pub fn cancel(&self) -> bool {
        self.shared.cancel(None)
    }

    /// Requests cancellation with a reason carried by [`TaskError::Canceled`].
    pub fn cancel_with(&self, reason: impl Into<String>) -> bool {
        self.shared.cancel(Some(reason.into()))
    }

    /// True if cancellation decided the outcome.
    pub fn is_canceled(&self) -> bool {
        self.shared.is_canceled()
    }
}

impl std::fmt::Debug for Canceler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canceler")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

/// A running task that resolves exactly once: with the body's outcome or with
/// [`TaskError::Canceled`].
#[must_use = "the body runs regardless; await the handle to observe its outcome"]
pub struct Cancelable<T> {
    fut: BoxFuture<'static, Result<T, TaskError>>,
    canceler: Canceler,
}

impl<T> Cancelable<T> {
    /// See [`Canceler::cancel`].
    pub fn cancel(&self) -> bool {
        self.canceler.cancel()
    }

    /// See [`Canceler::cancel_with`].
    pub fn cancel_with(&self, reason: impl Into<String>) -> bool {
        self.canceler.cancel_with(reason)
    }

    /// True if cancellation decided the outcome.
    pub fn is_canceled(&self) -> bool {
        self.canceler.is_canceled()
    }

    /// Returns a cancel handle usable from other tasks.
    pub fn canceler(&self) -> Canceler {
        self.canceler.clone()
    }
}

impl<T> Future for Cancelable<T> {
    type Output = Result<T, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.fut.as_mut().poll(cx)
    }
}

impl<T> std::fmt::Debug for Cancelable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancelable")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

/// Starts `task` immediately and returns a handle that can be cancelled.
///
/// Must be called inside a Tokio runtime.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use taskgate::{CancelContext, Task, TaskError, with_cancellation};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let handle = with_cancellation(Task::from_fn(|ctx: CancelContext| async move {
///     while !ctx.is_cancellation_requested() {
///         tokio::time::sleep(Duration::from_millis(5)).await;
///     }
///     Ok(())
/// }));
///
/// handle.cancel_with("too slow");
/// let err = handle.await.unwrap_err();
/// assert!(matches!(err, TaskError::Canceled { reason: Some(r) } if r == "too slow"));
/// # }
/// ```
pub fn with_cancellation<T>(mut task: Task<CancelContext, T>) -> Cancelable<T>
where
    T: Send + 'static,
{
    let shared = Arc::new(Shared {
        phase: Mutex::new(Phase::Running),
        token: CancellationToken::new(),
    });

    let body = task.spawn(CancelContext {
        token: shared.token.clone(),
    });
    let body_shared = Arc::clone(&shared);
    let join = tokio::spawn(async move {
        let res = body.await;
        body_shared.finish().then_some(res)
    });

    let race_shared = Arc::clone(&shared);
    let token = shared.token.clone();
    let fut = async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(race_shared.canceled_error()),
            joined = join => match joined {
                Ok(Some(res)) => res,
                Ok(None) => Err(race_shared.canceled_error()),
                Err(err) if race_shared.finish() => Err(TaskError::from_join(err)),
                Err(_) => Err(race_shared.canceled_error()),
            },
        }
    }
    .boxed();

    Cancelable {
        fut,
        canceler: Canceler { shared },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn resolves_with_body_outcome() {
        let ok = with_cancellation(Task::sync(|_ctx| Ok(5)));
        assert_eq!(ok.await.unwrap(), 5);

        let bad = with_cancellation(Task::from_fn(|_ctx| async {
            Err::<(), _>(TaskError::fail("nope"))
        }));
        assert_eq!(bad.await.unwrap_err().as_label(), "task_failed");
    }

    #[tokio::test]
    async fn cancel_before_settlement_wins() {
        let exited = Arc::new(AtomicBool::new(false));
        let flag = exited.clone();

        let handle = with_cancellation(Task::from_fn(move |ctx: CancelContext| {
            let flag = flag.clone();
            async move {
                ctx.cancelled().await;
                flag.store(true, Ordering::SeqCst);
                Ok("late value")
            }
        }));

        assert!(handle.cancel_with("stop"));
        assert!(handle.is_canceled());
        assert!(!handle.cancel(), "second cancel does not decide anything");

        match handle.await {
            Err(TaskError::Canceled { reason }) => assert_eq!(reason.as_deref(), Some("stop")),
            other => panic!("unexpected {other:?}"),
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(exited.load(Ordering::SeqCst), "body observes the token and exits");
    }

    #[tokio::test]
    async fn cancel_after_settlement_is_a_no_op() {
        let handle = with_cancellation(Task::sync(|_ctx| Ok(1)));
        let canceler = handle.canceler();
        assert_eq!(handle.await.unwrap(), 1);

        assert!(!canceler.cancel());
        assert!(!canceler.is_canceled());
    }

    #[tokio::test]
    async fn cancel_after_body_settles_keeps_outcome() {
        let handle = with_cancellation(Task::sync(|_ctx| Ok(9)));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!handle.cancel());
        assert!(!handle.is_canceled());
        assert_eq!(handle.await.unwrap(), 9);
    }

    #[tokio::test]
    async fn remote_canceler_interrupts_waiting_observer() {
        let handle = with_cancellation(Task::<CancelContext, ()>::from_fn(|ctx| async move {
            loop {
                ctx.check()?;
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        }));
        let canceler = handle.canceler();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceler.cancel();
        });

        let err = handle.await.unwrap_err();
        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn body_panic_is_reported() {
        let handle = with_cancellation(Task::from_fn(|_ctx| async {
            if true {
                panic!("boom");
            }
            Ok(())
        }));
        assert_eq!(handle.await.unwrap_err().as_label(), "task_panicked");
    }
}
