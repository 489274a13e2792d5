//! Listener registry: fires the `failedAttempt` / `retry` / `success` /
//! `failure` / `complete` events an [`crate::invocation::Invocation`] or
//! [`crate::future::RetryFuture`] goes through.

use std::sync::Arc;

use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::duration::Duration;
use crate::error::RetryError;
use crate::scheduler::{Scheduler, ThreadScheduler};

/// A single trial's outcome, passed to `failedAttempt`/`retry` listeners.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttemptContext<T, F> {
    pub attempt: u32,
    pub elapsed: Duration,
    pub result: Option<T>,
    pub failure: Option<F>,
}

/// The terminal outcome of a retry operation, passed to `success`/`failure`
/// listeners and, regardless of which of those fired, to `complete`
/// listeners as well.
///
/// The failure branch carries the full [`RetryError`] rather than the raw
/// user failure type, since a terminal failure may be `RetryExhausted`,
/// `Cancelled`, or `InterruptedDuringWait` as well as a bare
/// `OperationFailure` — unlike per-trial [`AttemptContext`], which always
/// carries the operation's own failure type.
#[derive(Debug, Clone)]
pub enum Outcome<T, F> {
    /// A trial produced a result the policy stopped retrying for.
    /// `accepted` is `false` when the stop was forced by retry-budget
    /// exhaustion rather than the policy's own condition rejecting further
    /// retries — the value is still returned to the caller, but the
    /// `success` listener does not fire for it (only `complete` does).
    Success { value: T, accepted: bool },
    Failure(RetryError<F>),
}

impl<T, F> Outcome<T, F> {
    /// Converts this outcome into the `Result` it represents.
    pub fn into_result(self) -> Result<T, RetryError<F>> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failure(err) => Err(err),
        }
    }
}

type AttemptListener<T, F> = Box<dyn Fn(&AttemptContext<T, F>) + Send + Sync>;
type OutcomeListener<T, F> = Box<dyn Fn(&Outcome<T, F>) + Send + Sync>;

/// Wraps `listener` so that, instead of running on the thread that resolved
/// the event, it is cloned onto `scheduler` with no delay. `T`/`F` must be
/// `Clone + Send + 'static` only for the duration of building this
/// closure — the resulting box carries no extra bounds of its own, so it
/// slots into the same storage as a synchronous listener.
fn dispatch_attempt<T, F>(
    scheduler: Arc<dyn Scheduler>,
    listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static,
) -> AttemptListener<T, F>
where
    T: Clone + Send + 'static,
    F: Clone + Send + 'static,
{
    let listener = Arc::new(listener);
    Box::new(move |ctx: &AttemptContext<T, F>| {
        let owned = ctx.clone();
        let listener = listener.clone();
        scheduler.schedule(Duration::NONE, Box::new(move || listener(&owned)));
    })
}

fn dispatch_outcome<T, F>(
    scheduler: Arc<dyn Scheduler>,
    listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static,
) -> OutcomeListener<T, F>
where
    T: Clone + Send + 'static,
    F: Clone + Send + 'static,
{
    let listener = Arc::new(listener);
    Box::new(move |outcome: &Outcome<T, F>| {
        let owned = outcome.clone();
        let listener = listener.clone();
        scheduler.schedule(Duration::NONE, Box::new(move || listener(&owned)));
    })
}

/// Holds every listener registered on one invocation/future.
///
/// Most registrations attach zero or one listener per event, so each slot
/// is a `SmallVec<[_; 2]>` to stay allocation-free in the common case.
pub struct ListenerRegistry<T, F> {
    failed_attempt: SmallVec<[AttemptListener<T, F>; 2]>,
    retry: SmallVec<[AttemptListener<T, F>; 2]>,
    success: SmallVec<[OutcomeListener<T, F>; 2]>,
    failure: SmallVec<[OutcomeListener<T, F>; 2]>,
    complete: SmallVec<[OutcomeListener<T, F>; 2]>,
}

impl<T, F> Default for ListenerRegistry<T, F> {
    fn default() -> Self {
        Self {
            failed_attempt: SmallVec::new(),
            retry: SmallVec::new(),
            success: SmallVec::new(),
            failure: SmallVec::new(),
            complete: SmallVec::new(),
        }
    }
}

impl<T, F> ListenerRegistry<T, F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires when a trial ended in failure or an unwanted result, whether
    /// or not a retry will follow.
    pub fn on_failed_attempt(&mut self, listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static) {
        self.failed_attempt.push(Box::new(listener));
    }

    /// Fires only when the policy decided to retry after a failed attempt.
    pub fn on_retry(&mut self, listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static) {
        self.retry.push(Box::new(listener));
    }

    /// Fires exactly once, when the operation terminates successfully.
    pub fn on_success(&mut self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static) {
        self.success.push(Box::new(listener));
    }

    /// Fires exactly once, when the operation terminates in failure
    /// (retries exhausted, cancelled, or otherwise non-retryable).
    pub fn on_failure(&mut self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static) {
        self.failure.push(Box::new(listener));
    }

    /// Fires exactly once, after whichever of `success`/`failure` fired.
    pub fn on_complete(&mut self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static) {
        self.complete.push(Box::new(listener));
    }

    /// Like [`Self::on_failed_attempt`], but `listener` runs dispatched onto
    /// `scheduler` rather than on the thread that resolved the event.
    pub fn on_failed_attempt_async_on(
        &mut self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static,
    ) where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.failed_attempt.push(dispatch_attempt(scheduler, listener));
    }

    /// [`Self::on_failed_attempt_async_on`] against the crate's default
    /// [`ThreadScheduler`].
    pub fn on_failed_attempt_async(&mut self, listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static)
    where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.on_failed_attempt_async_on(Arc::new(ThreadScheduler), listener);
    }

    /// Like [`Self::on_retry`], dispatched onto `scheduler`.
    pub fn on_retry_async_on(
        &mut self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static,
    ) where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.retry.push(dispatch_attempt(scheduler, listener));
    }

    /// [`Self::on_retry_async_on`] against the crate's default [`ThreadScheduler`].
    pub fn on_retry_async(&mut self, listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static)
    where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.on_retry_async_on(Arc::new(ThreadScheduler), listener);
    }

    /// Like [`Self::on_success`], dispatched onto `scheduler`.
    pub fn on_success_async_on(
        &mut self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static,
    ) where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.success.push(dispatch_outcome(scheduler, listener));
    }

    /// [`Self::on_success_async_on`] against the crate's default [`ThreadScheduler`].
    pub fn on_success_async(&mut self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static)
    where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.on_success_async_on(Arc::new(ThreadScheduler), listener);
    }

    /// Like [`Self::on_failure`], dispatched onto `scheduler`.
    pub fn on_failure_async_on(
        &mut self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static,
    ) where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.failure.push(dispatch_outcome(scheduler, listener));
    }

    /// [`Self::on_failure_async_on`] against the crate's default [`ThreadScheduler`].
    pub fn on_failure_async(&mut self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static)
    where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.on_failure_async_on(Arc::new(ThreadScheduler), listener);
    }

    /// Like [`Self::on_complete`], dispatched onto `scheduler`.
    pub fn on_complete_async_on(
        &mut self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static,
    ) where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.complete.push(dispatch_outcome(scheduler, listener));
    }

    /// [`Self::on_complete_async_on`] against the crate's default [`ThreadScheduler`].
    pub fn on_complete_async(&mut self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static)
    where
        T: Clone + Send + 'static,
        F: Clone + Send + 'static,
    {
        self.on_complete_async_on(Arc::new(ThreadScheduler), listener);
    }

    pub fn fire_failed_attempt(&self, ctx: &AttemptContext<T, F>) {
        for listener in &self.failed_attempt {
            listener(ctx);
        }
    }

    pub fn fire_retry(&self, ctx: &AttemptContext<T, F>) {
        for listener in &self.retry {
            listener(ctx);
        }
    }

    /// Fires the terminal `success`/`failure` listener for `outcome`,
    /// followed by every `complete` listener, exactly once. `Success`
    /// outcomes with `accepted: false` skip the `success` listener (the
    /// budget ran out, not the policy), but still reach `complete`.
    pub fn fire_terminal(&self, outcome: &Outcome<T, F>) {
        match outcome {
            Outcome::Success { accepted: true, .. } => {
                for listener in &self.success {
                    listener(outcome);
                }
            },
            Outcome::Success { accepted: false, .. } => {},
            Outcome::Failure(_) => {
                for listener in &self.failure {
                    listener(outcome);
                }
            },
        }
        for listener in &self.complete {
            listener(outcome);
        }
    }
}
