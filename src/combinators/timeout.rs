//! # Deadline race for a single task.
//!
//! The body is spawned on the runtime and raced against `tokio::time::timeout`.
//! Whichever settles first decides the outcome; the timer is owned by the race
//! and dropped on every exit path.
//!
//! Timeouts are non-preemptive: a body that loses the race keeps running in the
//! background and its eventual outcome is discarded.

use std::time::Duration;

use tokio::time;

use crate::error::TaskError;
use crate::tasks::Task;

/// Runs `task` with a deadline.
///
/// Returns the body's own outcome if it settles within `timeout`, otherwise
/// [`TaskError::Timeout`]. Must be called inside a Tokio runtime.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use taskgate::{Task, with_timeout};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let slow = Task::from_fn(|()| async {
///     tokio::time::sleep(Duration::from_secs(5)).await;
///     Ok(1)
/// });
/// let err = with_timeout(slow, Duration::from_millis(10)).await.unwrap_err();
/// assert!(err.is_timeout());
/// # }
/// ```
pub async fn with_timeout<T>(mut task: Task<(), T>, timeout: Duration) -> Result<T, TaskError>
where
    T: Send + 'static,
{
    let body = tokio::spawn(task.spawn(()));
    match time::timeout(timeout, body).await {
        Ok(Ok(res)) => res,
        Ok(Err(join)) => Err(TaskError::from_join(join)),
        Err(_elapsed) => Err(TaskError::Timeout { timeout }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn after(delay: Duration, value: u32) -> Task<(), u32> {
        Task::from_fn(move |()| async move {
            time::sleep(delay).await;
            Ok(value)
        })
    }

    #[tokio::test]
    async fn fast_task_keeps_its_value() {
        let res = with_timeout(after(Duration::from_millis(5), 3), Duration::from_millis(200)).await;
        assert_eq!(res.unwrap(), 3);
    }

    #[tokio::test]
    async fn fast_task_keeps_its_error() {
        let task = Task::<(), ()>::sync(|()| Err(TaskError::fail("bad input")));
        let err = with_timeout(task, Duration::from_millis(200)).await.unwrap_err();
        assert_eq!(err.as_label(), "task_failed");
    }

    #[tokio::test]
    async fn slow_task_times_out_and_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let task = Task::from_fn(move |()| {
            let flag = flag.clone();
            async move {
                time::sleep(Duration::from_millis(30)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        });

        match with_timeout(task, Duration::from_millis(5)).await {
            Err(TaskError::Timeout { timeout }) => assert_eq!(timeout, Duration::from_millis(5)),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!finished.load(Ordering::SeqCst));

        time::sleep(Duration::from_millis(60)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn zero_timeout_expires_before_slow_task() {
        let err = with_timeout(after(Duration::from_millis(20), 1), Duration::ZERO)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }
}
