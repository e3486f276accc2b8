//! # Task combinators.
//!
//! Free functions that wrap a [`Task`](crate::Task) (or a task factory) with one
//! extra behavior each:
//!
//! | Combinator             | Adds                                             |
//! |------------------------|--------------------------------------------------|
//! | [`with_cancellation`]  | cooperative cancel handle, settle-once guarantee |
//! | [`with_timeout`]       | deadline race (non-preemptive)                   |
//! | [`with_retries`]       | fresh attempts with a failure ledger and backoff |
//! | [`do_repeat`]          | sequential repetition by count or condition      |
//! | [`wait_for`]           | condition gate before a single run               |
//!
//! Combinators compose: a body given to one can be built from another, and any
//! of them can be enqueued on a [`Queue`](crate::Queue).

mod cancel;
mod repeat;
mod retry;
mod timeout;
mod wait;

pub use cancel::{CancelContext, Cancelable, Canceler, with_cancellation};
pub use repeat::{ConditionContext, RepeatContext, Repetition, do_repeat};
pub use retry::{RetryOptions, with_retries};
pub use timeout::with_timeout;
pub use wait::{WaitContext, wait_for};
