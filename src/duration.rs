//! A monotonic duration value type used throughout the retry engine.
//!
//! [`Duration`] is deliberately its own type rather than a re-export of
//! [`std::time::Duration`]: it normalizes to a single `u64` nanosecond count
//! (so it is `Copy`, `Ord`, and trivially serializable) and carries the
//! `NONE` sentinel policies use for "not configured". Conversions to and
//! from the standard type are provided for interop with `std::thread` and
//! `tokio::time`.

use core::time::Duration as CoreDuration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The unit a [`Duration`] was constructed with.
///
/// Durations always normalize to nanoseconds internally; the unit only
/// affects which constructor was used and is not retained after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    #[inline]
    const fn nanos_per_unit(self) -> u64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
        }
    }
}

/// A non-negative span of time, stored as whole nanoseconds.
///
/// `Duration::NONE` is the sentinel "no duration configured" used across
/// [`crate::policy::RetryPolicy`] for optional fields such as `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Duration {
    nanos: u64,
}

impl Duration {
    /// The zero duration, used as a sentinel for "not configured".
    pub const NONE: Self = Self { nanos: 0 };

    /// Builds a duration of `length` units of `unit`.
    #[inline]
    pub const fn new(length: u64, unit: TimeUnit) -> Self {
        Self { nanos: length.saturating_mul(unit.nanos_per_unit()) }
    }

    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self::new(millis, TimeUnit::Milliseconds)
    }

    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Self::new(secs, TimeUnit::Seconds)
    }

    /// Returns the duration in whole nanoseconds.
    #[inline]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.nanos / 1_000_000
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.nanos == 0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.nanos == 0
    }

    /// Multiplies this duration by `factor`, saturating at `u64::MAX` nanos.
    #[inline]
    pub fn scale(self, factor: f64) -> Self {
        let scaled = (self.nanos as f64) * factor;
        if scaled.is_finite() && scaled >= 0.0 {
            Self { nanos: scaled.min(u64::MAX as f64) as u64 }
        } else {
            self
        }
    }

    #[inline]
    pub const fn min(self, other: Self) -> Self {
        if self.nanos < other.nanos {
            self
        } else {
            other
        }
    }

    #[inline]
    pub const fn max(self, other: Self) -> Self {
        if self.nanos > other.nanos {
            self
        } else {
            other
        }
    }

    /// Saturating subtraction; never goes below `Duration::NONE`.
    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self { nanos: self.nanos.saturating_sub(other.nanos) }
    }
}

impl Default for Duration {
    #[inline]
    fn default() -> Self {
        Self::NONE
    }
}

impl From<CoreDuration> for Duration {
    #[inline]
    fn from(value: CoreDuration) -> Self {
        Self { nanos: value.as_nanos().min(u64::MAX as u128) as u64 }
    }
}

impl From<Duration> for CoreDuration {
    #[inline]
    fn from(value: Duration) -> Self {
        CoreDuration::from_nanos(value.nanos)
    }
}
