//! Automatic-mode async executor: the engine owns the operation closure
//! and drives every trial itself through a [`Scheduler`].
//!
//! Contextual mode needs no driver at all: a caller constructs a
//! [`RetryFuture`] directly (via [`crate::facade`]'s contextual entry
//! points) and calls [`RetryFuture::begin_trial`] /
//! [`RetryFuture::record_result`] / [`RetryFuture::record_failure`] itself.

use std::sync::Arc;

use crate::clock::Clock;
use crate::duration::Duration;
use crate::future::{RetryFuture, Signalled};
use crate::policy::RetryPolicy;
use crate::scheduler::Scheduler;

/// Runs one trial of `operation`, reports its outcome to `future`, and — if
/// the policy calls for another attempt — reschedules itself after the
/// computed wait. Recursion happens through the scheduler, not the call
/// stack: each invocation after the first runs in a freshly scheduled task.
pub fn drive_automatic<T, F>(
    future: RetryFuture<T, F>,
    scheduler: Arc<dyn Scheduler>,
    mut operation: impl FnMut() -> Result<T, F> + Send + 'static,
) where
    T: Send + PartialEq + Clone + 'static,
    F: Send + Clone + 'static,
{
    let trial = future.begin_trial();
    let signal = match operation() {
        Ok(value) => future.record_result(trial, value),
        Err(failure) => future.record_failure(trial, failure),
    };

    if let Signalled::Retry { wait, epoch } = signal {
        #[cfg(feature = "tracing")]
        tracing::trace!(epoch, wait_ms = wait.as_millis(), "scheduling next trial");
        let next_future = future.clone();
        let next_scheduler = scheduler.clone();
        let handle = scheduler.schedule(
            wait,
            Box::new(move || drive_automatic(next_future, next_scheduler, operation)),
        );
        future.set_pending_handle(epoch, handle);
    }
}

/// Kicks off automatic-mode execution of a value-returning `operation` and
/// returns its [`RetryFuture`] immediately; every trial (including the
/// first) runs as a task on `scheduler`, so the calling thread never
/// blocks.
pub fn get_async<T, F>(
    policy: RetryPolicy<T, F>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    operation: impl FnMut() -> Result<T, F> + Send + 'static,
) -> RetryFuture<T, F>
where
    T: Send + PartialEq + Clone + 'static,
    F: Send + Clone + 'static,
{
    let future = RetryFuture::new(policy, clock);
    let driver_future = future.clone();
    let driver_scheduler = scheduler.clone();
    scheduler.schedule(
        Duration::NONE,
        Box::new(move || drive_automatic(driver_future, driver_scheduler, operation)),
    );
    future
}

/// The `Runnable` counterpart to [`get_async`]: `operation` produces no
/// value, only success/failure.
pub fn run_async<F>(
    policy: RetryPolicy<(), F>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    mut operation: impl FnMut() -> Result<(), F> + Send + 'static,
) -> RetryFuture<(), F>
where
    F: Send + Clone + 'static,
{
    get_async(policy, clock, scheduler, move || operation())
}
