//! # Sequential repetition.
//!
//! [`do_repeat`] runs a task again and again, either a fixed number of times or
//! while a condition task returns `true`, and collects every result in order.
//! All iterations (and the condition) share one [`StateSlot`], so what one
//! iteration writes is what the next one reads.
//!
//! Any failure ends the sequence with a [`PartlyFailedError`] that keeps the
//! results collected so far. This includes a condition that cancels through
//! [`ConditionContext::cancel`]; [`PartlyFailedError::is_canceled`] tells the
//! two apart.

use crate::error::{PartlyFailedError, TaskError};
use crate::tasks::{StateSlot, Task};

/// How often [`do_repeat`] runs its task.
pub enum Repetition<S> {
    /// Exactly this many iterations.
    Times(usize),
    /// Before each iteration, run the condition; stop once it returns `false`.
    While(Task<ConditionContext<S>, bool>),
}

impl<S> From<usize> for Repetition<S> {
    fn from(n: usize) -> Self {
        Repetition::Times(n)
    }
}

impl<S> From<Task<ConditionContext<S>, bool>> for Repetition<S> {
    fn from(condition: Task<ConditionContext<S>, bool>) -> Self {
        Repetition::While(condition)
    }
}

impl<S> std::fmt::Debug for Repetition<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Repetition::Times(n) => f.debug_tuple("Times").field(n).finish(),
            Repetition::While(cond) => f.debug_tuple("While").field(cond).finish(),
        }
    }
}

/// Context of one [`do_repeat`] iteration.
pub struct RepeatContext<S> {
    index: usize,
    state: StateSlot<S>,
}

impl<S> RepeatContext<S> {
    /// Zero-based iteration index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Carry state shared with the other iterations and the condition.
    pub fn state(&self) -> &StateSlot<S> {
        &self.state
    }
}

/// Context of one condition evaluation in [`do_repeat`] or [`wait_for`](crate::wait_for).
pub struct ConditionContext<S> {
    index: usize,
    state: StateSlot<S>,
}

impl<S> ConditionContext<S> {
    pub(crate) fn new(index: usize, state: StateSlot<S>) -> Self {
        Self { index, state }
    }

    /// Number of earlier evaluations of this condition.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Carry state; values written here are visible to the task.
    pub fn state(&self) -> &StateSlot<S> {
        &self.state
    }

    /// Cancellation error to return from the condition: `return Err(ctx.cancel())`.
    pub fn cancel(&self) -> TaskError {
        TaskError::Canceled { reason: None }
    }

    /// Like [`cancel`](Self::cancel), with a reason.
    pub fn cancel_with(&self, reason: impl Into<String>) -> TaskError {
        TaskError::Canceled {
            reason: Some(reason.into()),
        }
    }
}

/// Runs `task` sequentially per `times` and collects the results.
///
/// # Example
/// ```rust
/// use taskgate::{RepeatContext, Task, do_repeat};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let doubled = do_repeat(4, Task::sync(|ctx: RepeatContext<()>| Ok(ctx.index() * 2)))
///     .await
///     .unwrap();
/// assert_eq!(doubled, vec![0, 2, 4, 6]);
/// # }
/// ```
pub async fn do_repeat<S, T>(
    times: impl Into<Repetition<S>>,
    mut task: Task<RepeatContext<S>, T>,
) -> Result<Vec<T>, PartlyFailedError<T>>
where
    S: Send + 'static,
    T: Send + 'static,
{
    let mut times = times.into();
    let state = StateSlot::new();
    let mut succeeded = Vec::new();
    if let Repetition::Times(n) = times {
        succeeded.reserve(n);
    }

    let mut index = 0;
    loop {
        let proceed = match &mut times {
            Repetition::Times(n) => index < *n,
            Repetition::While(condition) => {
                match condition.spawn(ConditionContext::new(index, state.clone())).await {
                    Ok(proceed) => proceed,
                    Err(source) => return Err(PartlyFailedError { succeeded, source }),
                }
            }
        };
        if !proceed {
            return Ok(succeeded);
        }

        let ctx = RepeatContext {
            index,
            state: state.clone(),
        };
        match task.spawn(ctx).await {
            Ok(value) => succeeded.push(value),
            Err(source) => return Err(PartlyFailedError { succeeded, source }),
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_produce_doubled_indices() {
        for n in 0..6usize {
            let out = do_repeat(n, Task::sync(|ctx: RepeatContext<()>| Ok(ctx.index() * 2)))
                .await
                .unwrap();
            let expected: Vec<usize> = (0..n).map(|i| 2 * i).collect();
            assert_eq!(out, expected);
        }
    }

    #[tokio::test]
    async fn failure_keeps_earlier_results() {
        let n = 5;
        let task = Task::sync(move |ctx: RepeatContext<()>| {
            if ctx.index() == n - 1 {
                Err(TaskError::fail("last one"))
            } else {
                Ok(ctx.index())
            }
        });

        let err = do_repeat(n, task).await.unwrap_err();
        assert_eq!(err.succeeded, vec![0, 1, 2, 3]);
        assert_eq!(err.source.as_label(), "task_failed");
        assert!(!err.is_canceled());
    }

    #[tokio::test]
    async fn state_carries_across_iterations() {
        let task = Task::from_fn(|ctx: RepeatContext<u32>| async move {
            let prev = ctx.state().get().unwrap_or(0);
            ctx.state().set(prev + 10);
            Ok(prev)
        });
        let out = do_repeat(3, task).await.unwrap();
        assert_eq!(out, vec![0, 10, 20]);
    }

    #[tokio::test]
    async fn condition_form_stops_when_false() {
        let condition = Task::sync(|ctx: ConditionContext<Vec<usize>>| {
            let seen = ctx.state().update(|s| s.get_or_insert_with(Vec::new).len());
            Ok(seen < 3)
        });
        let task = Task::sync(|ctx: RepeatContext<Vec<usize>>| {
            ctx.state().update(|s| s.get_or_insert_with(Vec::new).push(ctx.index()));
            Ok(ctx.index())
        });

        let out = do_repeat(condition, task).await.unwrap();
        assert_eq!(out, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn condition_cancel_is_wrapped_with_progress() {
        let condition = Task::sync(|ctx: ConditionContext<()>| {
            if ctx.index() == 2 {
                Err(ctx.cancel_with("enough"))
            } else {
                Ok(true)
            }
        });
        let task = Task::sync(|ctx: RepeatContext<()>| Ok(ctx.index()));

        let err = do_repeat(condition, task).await.unwrap_err();
        assert!(err.is_canceled());
        let (succeeded, source) = err.into_parts();
        assert_eq!(succeeded, vec![0, 1]);
        assert_eq!(source.to_string(), "operation cancelled: enough");
    }
}
