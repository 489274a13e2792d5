//! Advanced API level for library authors and power users.
//!
//! Exposes contextual mode, the scheduler abstraction, and the test doubles
//! needed to extend `retry-rail` or embed it in a custom async runtime.

// Contextual mode: drive the trial loop yourself.
pub use crate::facade::{get_contextual, get_contextual_with_clock, run_contextual};
pub use crate::future::{Signalled, Trial};

// The scheduler abstraction and batteries-included implementations.
pub use crate::scheduler::{Handle, Scheduler, ThreadScheduler};
#[cfg(feature = "async-tokio")]
pub use crate::scheduler::TokioScheduler;

// Driving automatic-mode execution on a caller-supplied scheduler.
pub use crate::facade::{get_async_on, run_async_on};

// Clock abstraction, for callers who want their own virtual time source.
pub use crate::clock::{Clock, SystemClock};

// Deterministic test doubles.
pub use crate::testing::{ManualScheduler, VirtualClock};
