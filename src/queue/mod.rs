//! # Bounded-concurrency task queue.
//!
//! [`Queue`] accepts [`Task`](crate::Task)s, admits them FIFO into an active
//! set of at most `concurrency` items and delivers each outcome through a
//! [`QueueHandle`].
//!
//! ```text
//! enqueue(task) ──► pending ──► admission loop ──► active ──► watcher runs body
//!      │                                                           │
//!      └──────────────── QueueHandle ◄──── result ◄────────────────┘
//! ```
//!
//! - `stop()` halts admission; executing bodies keep running.
//! - `clear()` drops bookkeeping; unstarted items resolve with `Discarded`.
//! - Bodies get a [`QueueContext`] to observe both and exit cooperatively.
//!
//! ## Example
//! ```rust
//! use taskgate::{Queue, QueueConfig, Task};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let queue = Queue::new(QueueConfig::with_concurrency(2)).unwrap();
//!
//! let handles: Vec<_> = (0..4u32)
//!     .map(|i| queue.enqueue(Task::from_fn(move |_ctx| async move { Ok(i * i) })))
//!     .collect();
//!
//! let mut out = Vec::new();
//! for h in handles {
//!     out.push(h.await.unwrap());
//! }
//! assert_eq!(out, vec![0, 1, 4, 9]);
//! # }
//! ```

mod builder;
mod config;
mod context;
mod core;
mod handle;
mod item;
#[allow(clippy::module_inception)]
mod queue;

pub use builder::QueueBuilder;
pub use config::{
    DEFAULT_ACTION_INTERVAL, DEFAULT_AUTO_START, DEFAULT_BUS_CAPACITY, DEFAULT_CONCURRENCY,
    DEFAULT_NEXT_ACTIONS_INTERVAL, QueueConfig,
};
pub use context::QueueContext;
pub use handle::QueueHandle;
pub use queue::Queue;
