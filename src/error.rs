//! Error categories for the retry engine.
//!
//! All failure modes surfaced by this crate are variants of a single
//! [`RetryError`], with `Display`/`Error` hand-implemented rather than
//! derived through an error-handling crate.

use std::fmt;

use crate::duration::Duration;

/// Terminal error produced by the retry engine.
///
/// `F` is the caller's own failure type, surfaced unchanged as the `cause`
/// of [`RetryError::RetryExhausted`] and wrapped directly by
/// [`RetryError::OperationFailure`]. Not `Serialize`/`Deserialize` even
/// behind the `serde` feature: `F` is caller-defined and not required to be
/// serializable.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryError<F> {
    /// A [`crate::policy::RetryPolicy`] builder constraint was violated.
    InvalidConfiguration(String),
    /// The user operation's own failure, offered to the policy but not
    /// (yet) terminal.
    OperationFailure(F),
    /// The policy no longer permits another attempt and the last trial
    /// ended in failure.
    RetryExhausted {
        attempts: u32,
        elapsed: Duration,
        cause: F,
    },
    /// The sync executor's inter-attempt sleep was interrupted.
    InterruptedDuringWait,
    /// The async future was cancelled before reaching a terminal state.
    Cancelled,
}

impl<F: fmt::Display> fmt::Display for RetryError<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(reason) => {
                write!(f, "invalid retry policy configuration: {reason}")
            },
            Self::OperationFailure(err) => write!(f, "operation failed: {err}"),
            Self::RetryExhausted { attempts, elapsed, cause } => {
                write!(
                    f,
                    "retry exhausted after {attempts} attempt(s), {}ms elapsed: {cause}",
                    elapsed.as_millis()
                )
            },
            Self::InterruptedDuringWait => write!(f, "interrupted while waiting to retry"),
            Self::Cancelled => write!(f, "retry future was cancelled"),
        }
    }
}

impl<F> std::error::Error for RetryError<F>
where
    F: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RetryExhausted { cause, .. } => Some(cause),
            Self::OperationFailure(cause) => Some(cause),
            _ => None,
        }
    }
}

impl<F> RetryError<F> {
    /// Returns `true` if this is a configuration-time error, never produced
    /// mid-execution.
    #[inline]
    pub const fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }

    /// Returns `true` if the future was cancelled rather than exhausted.
    #[inline]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns a reference to the wrapped user failure, if this variant
    /// carries one.
    pub const fn cause(&self) -> Option<&F> {
        match self {
            Self::OperationFailure(f) | Self::RetryExhausted { cause: f, .. } => Some(f),
            _ => None,
        }
    }
}
