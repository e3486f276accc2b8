//! # Task abstractions.
//!
//! - [`Task`] - uniform "start and observe completion" adapter over the three
//!   supported task shapes (sync callable, future factory, started operation)
//! - [`BoxTaskFuture`] - the future every [`Task::spawn`] returns
//! - [`StateSlot`] - carry-state cell shared between loop iterations

mod state;
mod task;

pub use state::StateSlot;
pub use task::{BoxTaskFuture, Task, TaskKind};
