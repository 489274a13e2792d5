//! The delayed-task abstraction retries are scheduled through.
//!
//! A `Scheduler` is an external collaborator, not something this crate
//! implements production logic for beyond a couple of batteries-included
//! options: a thread-backed default and, behind `async-tokio`, a
//! runtime-backed one. Callers embedding this crate in their own async
//! runtime supply their own.

mod thread_scheduler;

#[cfg(feature = "async-tokio")]
mod tokio_scheduler;

pub use thread_scheduler::ThreadScheduler;

#[cfg(feature = "async-tokio")]
pub use tokio_scheduler::TokioScheduler;

use std::sync::Arc;

use crate::duration::Duration;

/// A handle to a pending scheduled task.
pub trait Handle: Send + Sync {
    /// Requests cancellation. Has no effect if the task already ran or was
    /// already cancelled. Does not guarantee the task body hasn't started
    /// running concurrently.
    fn cancel(&self);

    /// Returns `true` once [`Handle::cancel`] has been called.
    fn is_cancelled(&self) -> bool;
}

/// Runs a closure after a delay, on whatever execution context the
/// implementation owns (a thread, a runtime task, a virtual clock).
pub trait Scheduler: Send + Sync {
    /// Schedules `task` to run after `delay` and returns a handle that can
    /// cancel it before it fires.
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> Arc<dyn Handle>;
}
