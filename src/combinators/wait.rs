//! # Condition gate.
//!
//! [`wait_for`] evaluates a condition until it returns `true`, yielding to the
//! scheduler between evaluations, then runs the task once. The condition may
//! leave a value in the shared [`StateSlot`] for the task to pick up.
//!
//! Condition failures are wrapped in [`TaskError::ConditionFailed`], except
//! cancellation, which is returned as is.

use crate::combinators::repeat::ConditionContext;
use crate::error::TaskError;
use crate::tasks::{StateSlot, Task};

/// Context of the task run by [`wait_for`].
pub struct WaitContext<S> {
    state: StateSlot<S>,
}

impl<S> WaitContext<S> {
    /// State left behind by the last condition evaluation.
    pub fn state(&self) -> &StateSlot<S> {
        &self.state
    }

    /// Takes the state value out of the slot.
    pub fn take_state(&self) -> Option<S> {
        self.state.take()
    }
}

/// Waits until `condition` returns `true`, then runs `task` once.
///
/// # Example
/// ```rust
/// use taskgate::{ConditionContext, Task, WaitContext, wait_for};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let ready = Task::sync(|ctx: ConditionContext<&str>| {
///     ctx.state().set("warm");
///     Ok(ctx.index() >= 2)
/// });
/// let run = Task::sync(|ctx: WaitContext<&str>| Ok(ctx.take_state()));
///
/// assert_eq!(wait_for(ready, run).await.unwrap(), Some("warm"));
/// # }
/// ```
pub async fn wait_for<S, T>(
    mut condition: Task<ConditionContext<S>, bool>,
    mut task: Task<WaitContext<S>, T>,
) -> Result<T, TaskError>
where
    S: Send + 'static,
    T: Send + 'static,
{
    let state = StateSlot::new();
    let mut index = 0;

    loop {
        match condition.spawn(ConditionContext::new(index, state.clone())).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) if err.is_canceled() => return Err(err),
            Err(err) => {
                return Err(TaskError::ConditionFailed {
                    source: Box::new(err),
                });
            }
        }
        index += 1;
        tokio::task::yield_now().await;
    }

    task.spawn(WaitContext { state }).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn runs_task_once_condition_holds() {
        let flag = Arc::new(AtomicBool::new(false));
        let setter = flag.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            setter.store(true, Ordering::SeqCst);
        });

        let f = flag.clone();
        let condition = Task::from_fn(move |_ctx: ConditionContext<()>| {
            let f = f.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                Ok(f.load(Ordering::SeqCst))
            }
        });
        let out = wait_for(condition, Task::sync(|_ctx: WaitContext<()>| Ok("done")))
            .await
            .unwrap();
        assert_eq!(out, "done");
    }

    #[tokio::test]
    async fn state_reaches_the_task() {
        let condition = Task::sync(|ctx: ConditionContext<usize>| {
            ctx.state().set(ctx.index() * 100);
            Ok(ctx.index() == 3)
        });
        let task = Task::sync(|ctx: WaitContext<usize>| Ok(ctx.state().get()));
        assert_eq!(wait_for(condition, task).await.unwrap(), Some(300));
    }

    #[tokio::test]
    async fn cancellation_propagates_unwrapped() {
        let condition = Task::sync(|ctx: ConditionContext<()>| Err(ctx.cancel()));
        let task = Task::sync(|_ctx: WaitContext<()>| Ok(()));

        let err = wait_for(condition, task).await.unwrap_err();
        assert!(matches!(err, TaskError::Canceled { reason: None }));
    }

    #[tokio::test]
    async fn other_condition_failures_are_wrapped() {
        let condition = Task::sync(|_ctx: ConditionContext<()>| Err(TaskError::fail("sensor broke")));
        let task = Task::sync(|_ctx: WaitContext<()>| Ok(()));

        match wait_for(condition, task).await {
            Err(TaskError::ConditionFailed { source }) => {
                assert_eq!(source.as_message(), "error: sensor broke");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
