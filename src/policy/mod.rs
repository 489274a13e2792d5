//! Retry policy: the declarative "should this trial retry, and how long
//! should it wait" contract.

mod condition;

pub use condition::{FailureCategory, FailureCategoryId, RetryCondition};

use std::fmt;
use std::sync::Arc;

use crate::duration::Duration;
use crate::error::RetryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelayKind {
    Fixed,
    Backoff,
}

/// Declares when a failed (or unwanted) trial should be retried, and the
/// inter-attempt delay schedule to use while doing so.
///
/// Built fluently: every mutator consumes and returns `Self`, and
/// constraints are only checked by the terminal [`RetryPolicy::build`] call,
/// a single fallible conversion rather than a series of panicking mutators
/// (see `DESIGN.md`).
pub struct RetryPolicy<T, F> {
    delay: Duration,
    max_delay: Option<Duration>,
    delay_multiplier: f64,
    max_duration: Option<Duration>,
    max_retries: i64,
    condition: RetryCondition<T, F>,
    delay_kind: Option<DelayKind>,
    conflicting_delay_calls: bool,
}

impl<T: Clone, F> Clone for RetryPolicy<T, F> {
    fn clone(&self) -> Self {
        Self {
            delay: self.delay,
            max_delay: self.max_delay,
            delay_multiplier: self.delay_multiplier,
            max_duration: self.max_duration,
            max_retries: self.max_retries,
            condition: self.condition.clone(),
            delay_kind: self.delay_kind,
            conflicting_delay_calls: self.conflicting_delay_calls,
        }
    }
}

impl<T, F> fmt::Debug for RetryPolicy<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("delay", &self.delay)
            .field("max_delay", &self.max_delay)
            .field("delay_multiplier", &self.delay_multiplier)
            .field("max_duration", &self.max_duration)
            .field("max_retries", &self.max_retries)
            .field("condition", &self.condition)
            .finish()
    }
}

impl<T, F> Default for RetryPolicy<T, F> {
    fn default() -> Self {
        Self {
            delay: Duration::NONE,
            max_delay: None,
            delay_multiplier: 0.0,
            max_duration: None,
            max_retries: -1,
            condition: RetryCondition::None,
            delay_kind: None,
            conflicting_delay_calls: false,
        }
    }
}

impl<T, F> RetryPolicy<T, F> {
    /// A fresh policy: unlimited retries, no delay, no condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fixed inter-attempt delay. Conflicts with [`Self::with_backoff`].
    pub fn with_delay(mut self, delay: Duration) -> Self {
        if self.delay_kind == Some(DelayKind::Backoff) {
            self.conflicting_delay_calls = true;
        }
        self.delay_kind = Some(DelayKind::Fixed);
        self.delay = delay;
        self
    }

    /// Exponential backoff starting at `delay`, capped at `max_delay`, using
    /// the default multiplier of `2.0`. Conflicts with [`Self::with_delay`].
    pub fn with_backoff(self, delay: Duration, max_delay: Duration) -> Self {
        self.with_backoff_multiplier(delay, max_delay, 2.0)
    }

    /// Exponential backoff with an explicit multiplier.
    pub fn with_backoff_multiplier(
        mut self,
        delay: Duration,
        max_delay: Duration,
        multiplier: f64,
    ) -> Self {
        if self.delay_kind == Some(DelayKind::Fixed) {
            self.conflicting_delay_calls = true;
        }
        self.delay_kind = Some(DelayKind::Backoff);
        self.delay = delay;
        self.max_delay = Some(max_delay);
        self.delay_multiplier = multiplier;
        self
    }

    /// Caps total elapsed time across all attempts.
    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    /// Caps the number of retries. `-1` (the default) means unlimited; `0`
    /// means never retry.
    pub fn with_max_retries(mut self, max_retries: i64) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Retries failures whose [`FailureCategory::category`] is one of
    /// `categories`.
    pub fn retry_on_failures(
        mut self,
        categories: impl IntoIterator<Item = FailureCategoryId>,
    ) -> Self
    where
        F: FailureCategory,
    {
        let wanted: Vec<FailureCategoryId> = categories.into_iter().collect();
        self.condition = RetryCondition::FailureCategories(Arc::new(move |failure: &F| {
            let actual = failure.category();
            wanted.iter().any(|candidate| *candidate == actual)
        }));
        self
    }

    /// Retries failures matching an arbitrary predicate.
    pub fn retry_on_failure_predicate(
        mut self,
        predicate: impl Fn(&F) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = RetryCondition::FailurePredicate(Arc::new(predicate));
        self
    }

    /// Retries only when a successful result equals `literal`.
    pub fn retry_on_result(mut self, literal: T) -> Self {
        self.condition = RetryCondition::ResultLiteral(literal);
        self
    }

    /// Retries when a successful result matches an arbitrary predicate.
    pub fn retry_on_result_predicate(
        mut self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = RetryCondition::ResultPredicate(Arc::new(predicate));
        self
    }

    /// A single predicate over `(result, failure)` that supersedes every
    /// other configured clause.
    pub fn completion_predicate(
        mut self,
        predicate: impl Fn(Option<&T>, Option<&F>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = RetryCondition::JointPredicate(Arc::new(predicate));
        self
    }

    /// Validates every builder constraint and finalizes the policy.
    pub fn build(self) -> Result<Self, RetryError<F>> {
        if self.conflicting_delay_calls {
            return Err(RetryError::InvalidConfiguration(
                "cannot configure both a fixed delay and a backoff on the same policy".into(),
            ));
        }
        if self.delay_kind == Some(DelayKind::Fixed) && self.delay.is_none() {
            return Err(RetryError::InvalidConfiguration(
                "with_delay requires a positive delay".into(),
            ));
        }
        if let Some(max_delay) = self.max_delay {
            if self.delay.is_none() || self.delay >= max_delay {
                return Err(RetryError::InvalidConfiguration(
                    "backoff delay must be less than max_delay".into(),
                ));
            }
            if self.delay_multiplier <= 1.0 {
                return Err(RetryError::InvalidConfiguration(
                    "backoff multiplier must be greater than 1".into(),
                ));
            }
        }
        if let Some(max_duration) = self.max_duration {
            if !self.delay.is_none() && self.delay >= max_duration {
                return Err(RetryError::InvalidConfiguration(
                    "delay must be less than max_duration".into(),
                ));
            }
        }
        if self.max_retries < -1 {
            return Err(RetryError::InvalidConfiguration(
                "max_retries must be -1 (unlimited) or greater".into(),
            ));
        }
        Ok(self)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    pub fn delay_multiplier(&self) -> f64 {
        self.delay_multiplier
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration
    }

    pub fn max_retries(&self) -> i64 {
        self.max_retries
    }

    pub fn has_backoff(&self) -> bool {
        self.max_delay.is_some()
    }
}

impl<T: PartialEq, F> RetryPolicy<T, F> {
    /// Decides whether a trial that produced `result` (on success) or
    /// `failure` (on error) should be retried, following a six-step
    /// evaluation order. Exactly one of `result`/`failure` is
    /// expected to be `Some`.
    pub fn allows_retries_for(&self, result: Option<&T>, failure: Option<&F>) -> bool {
        if self.max_retries == 0 {
            return false;
        }
        if self.max_duration.is_some_and(Duration::is_none) {
            return false;
        }
        if let RetryCondition::JointPredicate(predicate) = &self.condition {
            return predicate(result, failure);
        }
        if let Some(failure) = failure {
            return match &self.condition {
                RetryCondition::FailurePredicate(predicate) => predicate(failure),
                RetryCondition::FailureCategories(predicate) => predicate(failure),
                _ => true,
            };
        }
        match &self.condition {
            RetryCondition::ResultPredicate(predicate) => result.is_some_and(|r| predicate(r)),
            RetryCondition::ResultLiteral(literal) => result == Some(literal),
            _ => false,
        }
    }
}
