//! [`RetryFuture`]: the cancellable, awaitable handle to an in-flight async
//! retry operation.
//!
//! So that state transitions happen under the future's own monitor, the
//! mutable invocation state that a synchronous
//! [`crate::invocation::Invocation`] would own directly is folded into this
//! future's own `Mutex`, rather than kept in a separate, independently
//! locked `Invocation`. The plain [`crate::invocation::Invocation`] remains
//! standalone for the sync executor, where no such sharing is needed.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

#[cfg(feature = "async")]
use std::future::Future;
#[cfg(feature = "async")]
use std::pin::Pin;
#[cfg(feature = "async")]
use std::task::{Context, Poll, Waker};

use crate::clock::Clock;
use crate::duration::Duration;
use crate::error::RetryError;
use crate::invocation::{terminal_failure_error, Decision, Invocation, StopReason};
use crate::listener::{AttemptContext, ListenerRegistry, Outcome};
use crate::policy::RetryPolicy;
use crate::scheduler::{Handle, Scheduler};

/// A token identifying one trial, returned by [`RetryFuture::begin_trial`]
/// and handed back to [`RetryFuture::record_result`] /
/// [`RetryFuture::record_failure`] so a signal arriving after the trial's
/// epoch has moved on is recognized as stale and discarded.
#[derive(Debug, Clone, Copy)]
pub struct Trial {
    pub attempt: u32,
    epoch: u64,
}

/// What happened as a result of reporting a trial's outcome.
#[derive(Debug, Clone, Copy)]
pub enum Signalled {
    /// The signal was accepted and another trial was scheduled after
    /// `wait`, tagged with `epoch`.
    Retry { wait: Duration, epoch: u64 },
    /// The signal was accepted and resolved the future.
    Terminal,
    /// The signal's epoch no longer matches the current trial (a late or
    /// duplicate report) and was ignored.
    Stale,
}

enum Status<T, F> {
    Pending,
    Done(Outcome<T, F>),
}

struct State<T, F> {
    invocation: Invocation<T, F>,
    status: Status<T, F>,
    epoch: u64,
    pending: Option<Arc<dyn Handle>>,
    #[cfg(feature = "async")]
    waker: Option<Waker>,
}

struct Inner<T, F> {
    state: Mutex<State<T, F>>,
    condvar: Condvar,
    listeners: Mutex<ListenerRegistry<T, F>>,
}

/// A cancellable, exactly-once-resolving handle to an async retry
/// operation. Cheap to clone: every clone shares the same underlying
/// invocation state.
pub struct RetryFuture<T, F> {
    inner: Arc<Inner<T, F>>,
}

impl<T, F> Clone for RetryFuture<T, F> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T, F> RetryFuture<T, F> {
    pub(crate) fn new(policy: RetryPolicy<T, F>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    invocation: Invocation::new(policy, clock),
                    status: Status::Pending,
                    epoch: 0,
                    pending: None,
                    #[cfg(feature = "async")]
                    waker: None,
                }),
                condvar: Condvar::new(),
                listeners: Mutex::new(ListenerRegistry::new()),
            }),
        }
    }

    pub fn on_failed_attempt(&self, listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static) {
        self.inner.listeners.lock().unwrap().on_failed_attempt(listener);
    }

    pub fn on_retry(&self, listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static) {
        self.inner.listeners.lock().unwrap().on_retry(listener);
    }

    /// Registers a listener for successful completion. If the future has
    /// already resolved successfully, `listener` fires immediately with the
    /// stored outcome rather than being silently missed.
    pub fn on_success(&self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static) {
        let state = self.inner.state.lock().unwrap();
        if let Status::Done(outcome @ Outcome::Success { accepted: true, .. }) = &state.status {
            listener(outcome);
            return;
        }
        drop(state);
        self.inner.listeners.lock().unwrap().on_success(listener);
    }

    /// Registers a listener for terminal failure. If the future has already
    /// resolved in failure, `listener` fires immediately.
    pub fn on_failure(&self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static) {
        let state = self.inner.state.lock().unwrap();
        if let Status::Done(outcome @ Outcome::Failure(_)) = &state.status {
            listener(outcome);
            return;
        }
        drop(state);
        self.inner.listeners.lock().unwrap().on_failure(listener);
    }

    /// Registers a listener for either terminal outcome. If the future has
    /// already resolved, `listener` fires immediately.
    pub fn on_complete(&self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static) {
        let state = self.inner.state.lock().unwrap();
        if let Status::Done(outcome) = &state.status {
            listener(outcome);
            return;
        }
        drop(state);
        self.inner.listeners.lock().unwrap().on_complete(listener);
    }

    pub fn is_done(&self) -> bool {
        matches!(self.inner.state.lock().unwrap().status, Status::Done(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.inner.state.lock().unwrap().status,
            Status::Done(Outcome::Failure(RetryError::Cancelled))
        )
    }

    /// Cancels the future. A pending scheduled retry is cancelled, any
    /// current trial's eventual signal is ignored as stale, and the future
    /// resolves to [`RetryError::Cancelled`]. A no-op if already done.
    pub fn cancel(&self) {
        let mut state = self.inner.state.lock().unwrap();
        if matches!(state.status, Status::Done(_)) {
            return;
        }
        if let Some(handle) = state.pending.take() {
            handle.cancel();
        }
        state.epoch = state.epoch.wrapping_add(1);
        state.status = Status::Done(Outcome::Failure(RetryError::Cancelled));
        #[cfg(feature = "tracing")]
        tracing::debug!(epoch = state.epoch, "retry future cancelled");
        self.inner.listeners.lock().unwrap().fire_terminal(&Outcome::Failure(RetryError::Cancelled));
        self.inner.condvar.notify_all();
        #[cfg(feature = "async")]
        if let Some(waker) = state.waker.take() {
            drop(state);
            waker.wake();
        }
    }

    /// Records the handle of a scheduled next trial so [`Self::cancel`] can
    /// stop it. Ignored (and the handle immediately cancelled) if `epoch`
    /// is no longer current.
    pub(crate) fn set_pending_handle(&self, epoch: u64, handle: Arc<dyn Handle>) {
        let mut state = self.inner.state.lock().unwrap();
        if epoch == state.epoch && !matches!(state.status, Status::Done(_)) {
            state.pending = Some(handle);
        } else {
            handle.cancel();
        }
    }
}

impl<T, F> RetryFuture<T, F>
where
    T: Clone + Send + 'static,
    F: Clone + Send + 'static,
{
    /// Like [`Self::on_success`], but `listener` is dispatched onto
    /// `scheduler` rather than run on the thread that resolved the event —
    /// including the immediate replay when the future has already resolved.
    pub fn on_success_async_on(
        &self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static,
    ) {
        let state = self.inner.state.lock().unwrap();
        if let Status::Done(outcome @ Outcome::Success { accepted: true, .. }) = &state.status {
            let owned = outcome.clone();
            scheduler.schedule(Duration::NONE, Box::new(move || listener(&owned)));
            return;
        }
        drop(state);
        self.inner.listeners.lock().unwrap().on_success_async_on(scheduler, listener);
    }

    /// [`Self::on_success_async_on`] against the crate's default
    /// [`crate::scheduler::ThreadScheduler`].
    pub fn on_success_async(&self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static) {
        self.on_success_async_on(Arc::new(crate::scheduler::ThreadScheduler), listener);
    }

    /// Like [`Self::on_failure`], dispatched onto `scheduler`.
    pub fn on_failure_async_on(
        &self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static,
    ) {
        let state = self.inner.state.lock().unwrap();
        if let Status::Done(outcome @ Outcome::Failure(_)) = &state.status {
            let owned = outcome.clone();
            scheduler.schedule(Duration::NONE, Box::new(move || listener(&owned)));
            return;
        }
        drop(state);
        self.inner.listeners.lock().unwrap().on_failure_async_on(scheduler, listener);
    }

    /// [`Self::on_failure_async_on`] against the crate's default scheduler.
    pub fn on_failure_async(&self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static) {
        self.on_failure_async_on(Arc::new(crate::scheduler::ThreadScheduler), listener);
    }

    /// Like [`Self::on_complete`], dispatched onto `scheduler`.
    pub fn on_complete_async_on(
        &self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static,
    ) {
        let state = self.inner.state.lock().unwrap();
        if let Status::Done(outcome) = &state.status {
            let owned = outcome.clone();
            scheduler.schedule(Duration::NONE, Box::new(move || listener(&owned)));
            return;
        }
        drop(state);
        self.inner.listeners.lock().unwrap().on_complete_async_on(scheduler, listener);
    }

    /// [`Self::on_complete_async_on`] against the crate's default scheduler.
    pub fn on_complete_async(&self, listener: impl Fn(&Outcome<T, F>) + Send + Sync + 'static) {
        self.on_complete_async_on(Arc::new(crate::scheduler::ThreadScheduler), listener);
    }

    /// Like [`Self::on_failed_attempt`], dispatched onto `scheduler`.
    pub fn on_failed_attempt_async_on(
        &self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static,
    ) {
        self.inner.listeners.lock().unwrap().on_failed_attempt_async_on(scheduler, listener);
    }

    /// [`Self::on_failed_attempt_async_on`] against the crate's default scheduler.
    pub fn on_failed_attempt_async(&self, listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static) {
        self.on_failed_attempt_async_on(Arc::new(crate::scheduler::ThreadScheduler), listener);
    }

    /// Like [`Self::on_retry`], dispatched onto `scheduler`.
    pub fn on_retry_async_on(
        &self,
        scheduler: Arc<dyn Scheduler>,
        listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static,
    ) {
        self.inner.listeners.lock().unwrap().on_retry_async_on(scheduler, listener);
    }

    /// [`Self::on_retry_async_on`] against the crate's default scheduler.
    pub fn on_retry_async(&self, listener: impl Fn(&AttemptContext<T, F>) + Send + Sync + 'static) {
        self.on_retry_async_on(Arc::new(crate::scheduler::ThreadScheduler), listener);
    }
}

impl<T: PartialEq, F> RetryFuture<T, F> {
    /// Marks the start of a new trial, returning a token that must be
    /// passed back to [`Self::record_result`] or [`Self::record_failure`].
    pub fn begin_trial(&self) -> Trial {
        let mut state = self.inner.state.lock().unwrap();
        let attempt = state.invocation.begin_trial();
        Trial { attempt, epoch: state.epoch }
    }
}

impl<T: PartialEq + Clone, F: Clone> RetryFuture<T, F> {
    /// Reports that `trial` produced `value`.
    pub fn record_result(&self, trial: Trial, value: T) -> Signalled {
        self.settle(trial.epoch, Some(value), None)
    }

    /// Reports that `trial` failed with `failure`.
    pub fn record_failure(&self, trial: Trial, failure: F) -> Signalled {
        self.settle(trial.epoch, None, Some(failure))
    }

    fn settle(&self, epoch: u64, result: Option<T>, failure: Option<F>) -> Signalled {
        let mut state = self.inner.state.lock().unwrap();
        if epoch != state.epoch || matches!(state.status, Status::Done(_)) {
            return Signalled::Stale;
        }

        let decision = state.invocation.decide(result.as_ref(), failure.as_ref());
        let stats = state.invocation.stats();

        match decision {
            Decision::Retry(wait) => {
                let ctx = AttemptContext {
                    attempt: stats.attempts(),
                    elapsed: stats.elapsed(),
                    result,
                    failure,
                };
                state.epoch += 1;
                let next_epoch = state.epoch;
                #[cfg(feature = "tracing")]
                tracing::trace!(attempt = stats.attempts(), wait_ms = wait.as_millis(), epoch = next_epoch, "scheduling next trial");
                {
                    let listeners = self.inner.listeners.lock().unwrap();
                    listeners.fire_failed_attempt(&ctx);
                    listeners.fire_retry(&ctx);
                }
                Signalled::Retry { wait, epoch: next_epoch }
            },
            Decision::Stop(reason) => {
                let accepted = reason == StopReason::ConditionRejected;
                let (outcome, ctx) = match (result, failure) {
                    (Some(value), _) => {
                        let ctx = (!accepted).then(|| AttemptContext {
                            attempt: stats.attempts(),
                            elapsed: stats.elapsed(),
                            result: Some(value.clone()),
                            failure: None,
                        });
                        (Outcome::Success { value, accepted }, ctx)
                    },
                    (None, Some(err)) => {
                        let ctx = AttemptContext {
                            attempt: stats.attempts(),
                            elapsed: stats.elapsed(),
                            result: None,
                            failure: Some(err.clone()),
                        };
                        let error = terminal_failure_error(reason, stats.attempts(), stats.elapsed(), err);
                        (Outcome::Failure(error), Some(ctx))
                    },
                    (None, None) => (Outcome::Failure(RetryError::Cancelled), None),
                };
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt = stats.attempts(), ?reason, "retry future resolved");
                state.status = Status::Done(outcome);
                self.inner.condvar.notify_all();
                {
                    let listeners = self.inner.listeners.lock().unwrap();
                    if let Some(ctx) = &ctx {
                        listeners.fire_failed_attempt(ctx);
                    }
                    if let Status::Done(stored) = &state.status {
                        listeners.fire_terminal(stored);
                    }
                }
                #[cfg(feature = "async")]
                if let Some(waker) = state.waker.take() {
                    drop(state);
                    waker.wake();
                }
                Signalled::Terminal
            },
        }
    }
}

impl<T: Clone, F: Clone> RetryFuture<T, F> {
    /// Blocks the calling thread until the future resolves.
    pub fn get(&self) -> Result<T, RetryError<F>> {
        let mut state = self.inner.state.lock().unwrap();
        loop {
            if let Status::Done(outcome) = &state.status {
                return outcome.clone().into_result();
            }
            state = self.inner.condvar.wait(state).unwrap();
        }
    }

    /// Blocks the calling thread until the future resolves or `timeout`
    /// elapses, in which case `Err(RetryError::InterruptedDuringWait)` is
    /// returned without affecting the future itself.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, RetryError<F>> {
        let deadline = Instant::now() + std::time::Duration::from(timeout);
        let mut state = self.inner.state.lock().unwrap();
        loop {
            if let Status::Done(outcome) = &state.status {
                return outcome.clone().into_result();
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(RetryError::InterruptedDuringWait);
            }
            let (guard, _timeout_result) = self.inner.condvar.wait_timeout(state, deadline - now).unwrap();
            state = guard;
        }
    }
}

#[cfg(feature = "async")]
impl<T: Clone, F: Clone> Future for RetryFuture<T, F> {
    type Output = Result<T, RetryError<F>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.inner.state.lock().unwrap();
        match &state.status {
            Status::Done(outcome) => Poll::Ready(outcome.clone().into_result()),
            Status::Pending => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            },
        }
    }
}

#[cfg(feature = "async")]
impl<T: Clone, F: Clone> futures_core::FusedFuture for RetryFuture<T, F> {
    fn is_terminated(&self) -> bool {
        self.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VirtualClock;

    #[test]
    fn immediate_success_resolves_without_retry() {
        let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new().build().unwrap();
        let future = RetryFuture::new(policy, Arc::new(VirtualClock::new()));
        let trial = future.begin_trial();
        assert!(matches!(future.record_result(trial, 7), Signalled::Terminal));
        assert_eq!(future.get(), Ok(7));
    }

    #[test]
    fn failure_past_budget_is_retry_exhausted() {
        let policy: RetryPolicy<u32, &'static str> =
            RetryPolicy::new().with_max_retries(0).build().unwrap();
        let future = RetryFuture::new(policy, Arc::new(VirtualClock::new()));
        let trial = future.begin_trial();
        assert!(matches!(future.record_failure(trial, "boom"), Signalled::Terminal));
        let err = future.get().unwrap_err();
        assert!(matches!(err, RetryError::RetryExhausted { .. }));
    }

    #[test]
    fn cancel_resolves_future_as_cancelled() {
        let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new().build().unwrap();
        let future = RetryFuture::new(policy, Arc::new(VirtualClock::new()));
        future.cancel();
        assert!(future.is_cancelled());
        assert!(matches!(future.get(), Err(RetryError::Cancelled)));
    }

    #[test]
    fn stale_signal_after_retry_is_ignored() {
        let policy: RetryPolicy<u32, &'static str> =
            RetryPolicy::new().with_max_retries(-1).build().unwrap();
        let future = RetryFuture::new(policy, Arc::new(VirtualClock::new()));
        let first = future.begin_trial();
        assert!(matches!(future.record_failure(first, "boom"), Signalled::Retry { .. }));
        // A second, stale report against the first trial's token must not
        // resolve the future.
        assert!(matches!(future.record_result(first, 1), Signalled::Stale));
        assert!(!future.is_done());
    }
}
