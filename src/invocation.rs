//! A single run of an operation through a [`RetryPolicy`].
//!
//! `Invocation` is exclusively owned by whichever executor drives it (the
//! sync executor, directly; the async executor folds the equivalent state
//! into [`crate::future::RetryFuture`]'s shared monitor instead — see
//! `DESIGN.md`).

use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::clock::{elapsed_since, Clock};
use crate::duration::Duration;
use crate::error::RetryError;
use crate::policy::RetryPolicy;

/// Attempt/timing counters accumulated over an invocation's lifetime.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InvocationStats {
    attempts: u32,
    elapsed: Duration,
    last_wait: Duration,
}

impl InvocationStats {
    /// Number of trials run so far, including the current one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Wall-clock time elapsed since the invocation started.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The wait computed before the most recent retry, or `Duration::NONE`
    /// if no retry has happened yet.
    pub fn last_wait(&self) -> Duration {
        self.last_wait
    }
}

/// Why an invocation stopped retrying, distinguishing "ran out of budget"
/// from "the policy simply doesn't want to retry this outcome" — the two
/// map to different [`crate::error::RetryError`] variants on the failure
/// path (`RetryExhausted` vs. `OperationFailure`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `max_retries` or `max_duration` has been reached.
    Exhausted,
    /// The retry condition rejected this particular result/failure.
    ConditionRejected,
}

/// What an invocation should do after a trial completes.
#[derive(Debug, Clone, Copy)]
pub enum Decision {
    /// Sleep for the given duration, then run another trial.
    Retry(Duration),
    /// No further trials; the last outcome is terminal.
    Stop(StopReason),
}

/// Computes the wait before the `attempt`-th retry (1-based: `attempt == 1`
/// is the wait before the first retry), clamped to `max_delay` and to
/// whatever `max_duration` budget remains after `elapsed`.
///
/// Returns `None` if no time remains under `max_duration`.
pub fn compute_wait<T, F>(policy: &RetryPolicy<T, F>, attempt: u32, elapsed: Duration) -> Option<Duration> {
    let mut wait = if policy.has_backoff() {
        let exponent = attempt.saturating_sub(1) as i32;
        let scaled = policy.delay().scale(policy.delay_multiplier().powi(exponent));
        match policy.max_delay() {
            Some(max_delay) => scaled.min(max_delay),
            None => scaled,
        }
    } else {
        policy.delay()
    };

    if let Some(max_duration) = policy.max_duration() {
        let remaining = max_duration.saturating_sub(elapsed);
        if remaining.is_zero() {
            return None;
        }
        wait = wait.min(remaining);
    }

    Some(wait)
}

/// Returns `true` once `attempts`/`elapsed` have exhausted the policy's
/// `max_retries`/`max_duration` budgets, independent of any retry
/// condition.
pub fn is_policy_exceeded<T, F>(policy: &RetryPolicy<T, F>, attempts: u32, elapsed: Duration) -> bool {
    if policy.max_retries() != -1 && i64::from(attempts) > policy.max_retries() {
        return true;
    }
    if let Some(max_duration) = policy.max_duration() {
        if !max_duration.is_none() && elapsed >= max_duration {
            return true;
        }
    }
    false
}

/// Converts a terminal failed trial into the matching [`RetryError`]
/// variant: budget exhaustion surfaces as `RetryExhausted`, a policy that
/// simply doesn't want this failure retried surfaces it unchanged as
/// `OperationFailure`.
pub fn terminal_failure_error<F>(
    reason: StopReason,
    attempts: u32,
    elapsed: Duration,
    failure: F,
) -> RetryError<F> {
    match reason {
        StopReason::Exhausted => RetryError::RetryExhausted { attempts, elapsed, cause: failure },
        StopReason::ConditionRejected => RetryError::OperationFailure(failure),
    }
}

/// Drives one operation's attempts against a [`RetryPolicy`], owning the
/// attempt counter, elapsed-time tracking, and the retry/stop decision.
pub struct Invocation<T, F> {
    policy: RetryPolicy<T, F>,
    clock: Arc<dyn Clock>,
    start: Instant,
    stats: InvocationStats,
}

impl<T: PartialEq, F> Invocation<T, F> {
    pub fn new(policy: RetryPolicy<T, F>, clock: Arc<dyn Clock>) -> Self {
        let start = clock.now();
        Self { policy, clock, start, stats: InvocationStats::default() }
    }

    pub fn stats(&self) -> InvocationStats {
        self.stats
    }

    /// Marks the start of a new trial, returning its 1-based attempt
    /// number.
    pub fn begin_trial(&mut self) -> u32 {
        self.stats.attempts += 1;
        self.stats.elapsed = elapsed_since(self.clock.now(), self.start);
        self.stats.attempts
    }

    /// Decides what to do after a trial produced `result` (on success) or
    /// `failure` (on error). Exactly one of the two is expected to be
    /// `Some`.
    pub fn decide(&mut self, result: Option<&T>, failure: Option<&F>) -> Decision {
        self.stats.elapsed = elapsed_since(self.clock.now(), self.start);

        if is_policy_exceeded(&self.policy, self.stats.attempts, self.stats.elapsed) {
            return Decision::Stop(StopReason::Exhausted);
        }
        if !self.policy.allows_retries_for(result, failure) {
            return Decision::Stop(StopReason::ConditionRejected);
        }
        match compute_wait(&self.policy, self.stats.attempts, self.stats.elapsed) {
            Some(wait) => {
                self.stats.last_wait = wait;
                Decision::Retry(wait)
            },
            None => Decision::Stop(StopReason::Exhausted),
        }
    }
}
