//! # taskgate
//!
//! **Taskgate** is a small toolkit of async task-control primitives for Tokio.
//!
//! It provides a bounded-concurrency FIFO queue and a set of combinators
//! (cancellation, timeout, retry, repeat, wait) that all speak the same
//! [`Task`] / [`TaskError`] vocabulary, so they compose freely.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Task::sync / Task::from_fn / Task::from_future / with_worker
//!                               │
//!        ┌──────────────────────┼─────────────────────────────────┐
//!        ▼                      ▼                                 ▼
//! ┌──────────────┐   ┌─────────────────────┐   ┌───────────────────────────────┐
//! │    Queue     │   │     Combinators     │   │            Worker             │
//! │ pending FIFO │   │ with_cancellation   │   │ ProcessWorker (child process) │
//! │ active ≤ k   │   │ with_timeout        │   └───────────────────────────────┘
//! │ QueueHandle  │   │ with_retries        │
//! └──────┬───────┘   │ do_repeat, wait_for │
//!        │           └──────────┬──────────┘
//!        │ Publishes            │ Publishes (with_retries, if a bus is attached)
//!        │ - ItemQueued         │ - AttemptFailed
//!        │ - ItemStarted        │ - RetryScheduled
//!        │ - ItemFailed ...     │ - RetriesExhausted
//!        ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                  (capacity: QueueConfig::bus_capacity)            │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       │      (per queue)       │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                           (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1   worker2   workerN
//!                         ▼         ▼         ▼
//!                     sub1.on   sub2.on   subN.on
//!                      _event()  _event()  _event()
//! ```
//!
//! ### Queue item lifecycle
//! ```text
//! enqueue ──► Queued ──admit──► Active ──readiness confirmed──► Executing ──► settled
//!               │                 │                                 │
//!               └──── clear() ────┴──► Discarded         stop()/clear() never interrupt;
//!                                                        the body may watch QueueContext
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / functions                        |
//! |-------------------|----------------------------------------------------------|----------------------------------------------|
//! | **Tasks**         | One shape for sync, async and already-started work.      | [`Task`], [`StateSlot`]                      |
//! | **Queue**         | FIFO admission with a concurrency limit.                 | [`Queue`], [`QueueConfig`], [`QueueHandle`]  |
//! | **Cancellation**  | Cooperative cancel with a settle-once guarantee.         | [`with_cancellation`], [`Cancelable`]        |
//! | **Timeout**       | Deadline race, non-preemptive.                           | [`with_timeout`]                             |
//! | **Retry**         | Fresh attempts, failure ledger, backoff and jitter.      | [`with_retries`], [`RetryOptions`]           |
//! | **Loops**         | Repeat by count or condition; wait for a condition.      | [`do_repeat`], [`wait_for`]                  |
//! | **Workers**       | Run work in a child process.                             | [`Worker`], [`ProcessWorker`]                |
//! | **Subscriber API**| Observe queue and retry events.                          | [`Subscribe`], [`Event`]                     |
//! | **Errors**        | Typed errors for every failure mode.                     | [`TaskError`], [`ConfigError`]               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use taskgate::{Queue, QueueConfig, QueueContext, RetryOptions, Task, TaskError, with_retries};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn taskgate::Subscribe>> = vec![Arc::new(taskgate::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn taskgate::Subscribe>> = Vec::new();
//!
//!     let queue = Queue::builder(QueueConfig::with_concurrency(2))
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     // Each queued body retries its own flaky call.
//!     let handles: Vec<_> = (0..4u64)
//!         .map(|n| {
//!             queue.enqueue(Task::from_fn(move |ctx: QueueContext| async move {
//!                 with_retries(
//!                     || {
//!                         let ctx = ctx.clone();
//!                         async move {
//!                             if !ctx.is_queue_active() {
//!                                 return Err(TaskError::Canceled { reason: None });
//!                             }
//!                             Ok(n * 10)
//!                         }
//!                     },
//!                     RetryOptions::new(2).wait_before_retry(Duration::from_millis(10)),
//!                 )
//!                 .await
//!             }))
//!         })
//!         .collect();
//!
//!     for h in handles {
//!         println!("result: {}", h.await?);
//!     }
//!     Ok(())
//! }
//! ```
mod combinators;
mod error;
mod events;
mod policies;
mod queue;
mod subscribers;
mod tasks;
mod worker;

// ---- Public re-exports ----

pub use combinators::{
    CancelContext, Cancelable, Canceler, ConditionContext, RepeatContext, Repetition,
    RetryOptions, WaitContext, do_repeat, wait_for, with_cancellation, with_retries,
    with_timeout,
};
pub use error::{ConfigError, FailedAttempt, PartlyFailedError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use queue::{
    DEFAULT_ACTION_INTERVAL, DEFAULT_AUTO_START, DEFAULT_BUS_CAPACITY, DEFAULT_CONCURRENCY,
    DEFAULT_NEXT_ACTIONS_INTERVAL, Queue, QueueBuilder, QueueConfig, QueueContext, QueueHandle,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, StateSlot, Task, TaskKind};
pub use worker::{ProcessWorker, Worker, WorkerOutput, with_worker};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
