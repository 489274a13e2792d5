//! The crate's top-level entry points.
//!
//! Naming follows the `run`/`get` split common to retry libraries in this
//! space: `run` is for void-returning operations, `get` for value-returning
//! ones; `*_async` variants execute automatically on a [`Scheduler`]
//! instead of blocking the calling thread; `*_contextual` variants hand the
//! caller a bare [`RetryFuture`] with no operation attached, for callers
//! who drive their own trial loop (e.g. one already running inside an
//! external async runtime).

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::RetryError;
use crate::executor::{execute, get_async as get_async_impl, run_async as run_async_impl};
use crate::future::RetryFuture;
use crate::listener::ListenerRegistry;
use crate::policy::RetryPolicy;
use crate::scheduler::{Scheduler, ThreadScheduler};

/// Blocking execution of a value-returning operation.
pub fn get<T, F>(
    policy: RetryPolicy<T, F>,
    operation: impl FnMut() -> Result<T, F>,
) -> Result<T, RetryError<F>>
where
    T: Clone + PartialEq,
    F: Clone,
{
    execute(policy, Arc::new(SystemClock), &ListenerRegistry::new(), operation)
}

/// Blocking execution of a void-returning operation.
pub fn run<F>(
    policy: RetryPolicy<(), F>,
    mut operation: impl FnMut() -> Result<(), F>,
) -> Result<(), RetryError<F>>
where
    F: Clone,
{
    get(policy, move || operation())
}

/// Like [`get`], but reporting every attempt and terminal event to
/// `listeners` as it runs.
pub fn get_with_listeners<T, F>(
    policy: RetryPolicy<T, F>,
    listeners: &ListenerRegistry<T, F>,
    operation: impl FnMut() -> Result<T, F>,
) -> Result<T, RetryError<F>>
where
    T: Clone + PartialEq,
    F: Clone,
{
    execute(policy, Arc::new(SystemClock), listeners, operation)
}

/// Like [`run`], but reporting every attempt and terminal event to
/// `listeners` as it runs.
pub fn run_with_listeners<F>(
    policy: RetryPolicy<(), F>,
    listeners: &ListenerRegistry<(), F>,
    mut operation: impl FnMut() -> Result<(), F>,
) -> Result<(), RetryError<F>>
where
    F: Clone,
{
    get_with_listeners(policy, listeners, move || operation())
}

/// Automatic-mode async execution of a value-returning operation, driven on
/// a background thread via [`ThreadScheduler`]. The calling thread never
/// blocks; use [`RetryFuture::get`] or `.await` it to observe the result.
pub fn get_async<T, F>(
    policy: RetryPolicy<T, F>,
    operation: impl FnMut() -> Result<T, F> + Send + 'static,
) -> RetryFuture<T, F>
where
    T: Send + PartialEq + Clone + 'static,
    F: Send + Clone + 'static,
{
    get_async_impl(policy, Arc::new(SystemClock), Arc::new(ThreadScheduler), operation)
}

/// Automatic-mode async execution of a void-returning operation.
pub fn run_async<F>(
    policy: RetryPolicy<(), F>,
    operation: impl FnMut() -> Result<(), F> + Send + 'static,
) -> RetryFuture<(), F>
where
    F: Send + Clone + 'static,
{
    run_async_impl(policy, Arc::new(SystemClock), Arc::new(ThreadScheduler), operation)
}

/// Like [`get_async`], but driven on a caller-supplied [`Scheduler`] (for
/// example a [`crate::scheduler::TokioScheduler`]) instead of the default
/// thread-backed one.
pub fn get_async_on<T, F>(
    policy: RetryPolicy<T, F>,
    scheduler: Arc<dyn Scheduler>,
    operation: impl FnMut() -> Result<T, F> + Send + 'static,
) -> RetryFuture<T, F>
where
    T: Send + PartialEq + Clone + 'static,
    F: Send + Clone + 'static,
{
    get_async_impl(policy, Arc::new(SystemClock), scheduler, operation)
}

/// Like [`run_async`], but driven on a caller-supplied [`Scheduler`].
pub fn run_async_on<F>(
    policy: RetryPolicy<(), F>,
    scheduler: Arc<dyn Scheduler>,
    operation: impl FnMut() -> Result<(), F> + Send + 'static,
) -> RetryFuture<(), F>
where
    F: Send + Clone + 'static,
{
    run_async_impl(policy, Arc::new(SystemClock), scheduler, operation)
}

/// Contextual mode: no operation is invoked by the engine. The caller
/// drives its own trial loop and reports outcomes back through
/// [`RetryFuture::begin_trial`] / [`RetryFuture::record_result`] /
/// [`RetryFuture::record_failure`].
pub fn get_contextual<T, F>(policy: RetryPolicy<T, F>) -> RetryFuture<T, F> {
    RetryFuture::new(policy, Arc::new(SystemClock))
}

/// Void-returning counterpart to [`get_contextual`].
pub fn run_contextual<F>(policy: RetryPolicy<(), F>) -> RetryFuture<(), F> {
    RetryFuture::new(policy, Arc::new(SystemClock))
}

/// Either contextual entry point, but against a caller-supplied [`Clock`]
/// (primarily for tests using [`crate::testing::VirtualClock`]).
pub fn get_contextual_with_clock<T, F>(
    policy: RetryPolicy<T, F>,
    clock: Arc<dyn Clock>,
) -> RetryFuture<T, F> {
    RetryFuture::new(policy, clock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;
    use std::cell::Cell;

    #[test]
    fn get_runs_synchronously_and_returns_value() {
        let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new().build().unwrap();
        assert_eq!(get(policy, || Ok::<_, &'static str>(10)), Ok(10));
    }

    #[test]
    fn run_discards_the_unit_value() {
        let policy: RetryPolicy<(), &'static str> = RetryPolicy::new()
            .with_delay(Duration::from_millis(1))
            .build()
            .unwrap();
        let attempts = Cell::new(0);
        let result = run(policy, || {
            attempts.set(attempts.get() + 1);
            if attempts.get() < 2 {
                Err("again")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Ok(()));
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn contextual_mode_requires_caller_driven_trials() {
        let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new().build().unwrap();
        let future = get_contextual(policy);
        let trial = future.begin_trial();
        future.record_result(trial, 1);
        assert_eq!(future.get(), Ok(1));
    }
}
