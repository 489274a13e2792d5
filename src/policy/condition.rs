//! The sum-type representation of "when should this trial be retried"
//! rather than a stack of independently-settable optional fields.

use std::fmt;
use std::sync::Arc;

/// Tags a user failure type with a coarse retry category, so policies can
/// say "retry on `Transient`" without hand-writing a predicate closure.
pub trait FailureCategory {
    fn category(&self) -> FailureCategoryId;
}

/// An opaque, comparable tag identifying a failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FailureCategoryId(pub &'static str);

/// The active retry condition for a [`super::RetryPolicy`].
///
/// Each builder call that configures a condition (`retry_on_failures`,
/// `retry_on_failure_predicate`, `retry_on_result`, `retry_on_result_predicate`,
/// `completion_predicate`) replaces whichever condition was previously set.
/// Representing this as an exclusive tagged union, rather than several
/// independently-settable `Option` fields, makes the evaluation order in
/// [`super::RetryPolicy::allows_retries_for`] total: there is always exactly
/// one active condition, never a stack of them to fall through.
pub enum RetryCondition<T, F> {
    /// No condition configured: retries are allowed for every failure and
    /// denied for every successful result.
    None,
    /// Retry failures whose [`FailureCategory::category`] is in a
    /// precomputed set.
    FailureCategories(Arc<dyn Fn(&F) -> bool + Send + Sync>),
    /// Retry failures matching an arbitrary predicate.
    FailurePredicate(Arc<dyn Fn(&F) -> bool + Send + Sync>),
    /// Retry only when the operation's result equals a fixed literal.
    ResultLiteral(T),
    /// Retry when the operation's result matches an arbitrary predicate.
    ResultPredicate(Arc<dyn Fn(&T) -> bool + Send + Sync>),
    /// A single predicate over `(result, failure)` that supersedes every
    /// other clause.
    JointPredicate(Arc<dyn Fn(Option<&T>, Option<&F>) -> bool + Send + Sync>),
}

impl<T: Clone, F> Clone for RetryCondition<T, F> {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::FailureCategories(pred) => Self::FailureCategories(pred.clone()),
            Self::FailurePredicate(pred) => Self::FailurePredicate(pred.clone()),
            Self::ResultLiteral(value) => Self::ResultLiteral(value.clone()),
            Self::ResultPredicate(pred) => Self::ResultPredicate(pred.clone()),
            Self::JointPredicate(pred) => Self::JointPredicate(pred.clone()),
        }
    }
}

impl<T, F> fmt::Debug for RetryCondition<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::None => "None",
            Self::FailureCategories(_) => "FailureCategories",
            Self::FailurePredicate(_) => "FailurePredicate",
            Self::ResultLiteral(_) => "ResultLiteral",
            Self::ResultPredicate(_) => "ResultPredicate",
            Self::JointPredicate(_) => "JointPredicate",
        };
        f.debug_tuple("RetryCondition").field(&tag).finish()
    }
}
