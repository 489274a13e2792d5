//! A general-purpose retry engine.
//!
//! `retry-rail` focuses on three pillars:
//! 1. **A declarative policy** — [`RetryPolicy`] describes delay/backoff,
//!    limits, and exactly which results or failures should be retried,
//!    without coupling that decision to any particular execution strategy.
//! 2. **Two execution strategies** — [`facade::get`]/[`facade::run`] block
//!    the calling thread; [`facade::get_async`]/[`facade::run_async`] drive
//!    trials automatically on a [`scheduler::Scheduler`] and hand back a
//!    cancellable [`future::RetryFuture`]. Contextual mode
//!    ([`facade::get_contextual`]) hands back a bare `RetryFuture` for
//!    callers who drive their own trial loop.
//! 3. **Listener-observable execution** — every attempt, retry, and
//!    terminal outcome can be observed without altering control flow.
//!
//! # Examples
//!
//! ## Blocking retry with backoff
//!
//! ```
//! use retry_rail::prelude::*;
//!
//! let policy = RetryPolicy::new()
//!     .with_backoff(Duration::from_millis(10), Duration::from_millis(500))
//!     .with_max_retries(4)
//!     .build()
//!     .unwrap();
//!
//! let result = get(policy, || Ok::<_, &'static str>(7));
//! assert_eq!(result, Ok(7));
//! ```
//!
//! ## Automatic async retry
//!
//! ```
//! use retry_rail::prelude_async::*;
//!
//! let policy = RetryPolicy::new().with_max_retries(2).build().unwrap();
//! let future = get_async(policy, || Ok::<_, &'static str>(1));
//! assert_eq!(future.get(), Ok(1));
//! ```
//!
//! # API tiers
//!
//! New to the crate? Start with [`simple`]. Building a service that needs
//! async execution and listeners? Reach for [`intermediate`]. Embedding
//! `retry-rail` in a custom runtime or writing your own [`Scheduler`]?
//! See [`advanced`].
//!
//! [`Scheduler`]: scheduler::Scheduler

/// Monotonic time source abstraction ([`clock::Clock`], [`clock::SystemClock`]).
pub mod clock;
/// The `Duration` value type used throughout the crate.
pub mod duration;
/// The `RetryError` taxonomy.
pub mod error;
/// The blocking and async retry engines.
pub mod executor;
/// The top-level `run`/`get`/`*_async`/`*_contextual` entry points.
pub mod facade;
/// `RetryFuture`: the cancellable, awaitable async retry handle.
pub mod future;
/// A single run of an operation through a policy (sync executor state).
pub mod invocation;
/// Attempt/retry/success/failure/complete event listeners.
pub mod listener;
/// `RetryPolicy` and the retry-condition sum type.
pub mod policy;
/// The delayed-task scheduler abstraction.
pub mod scheduler;
/// Deterministic virtual clock and manually-driven scheduler for tests.
pub mod testing;

/// Beginner-friendly minimal surface — see the module docs.
pub mod simple;
/// Service-developer surface: async execution, listeners, conditions.
pub mod intermediate;
/// Library-author surface: contextual mode, scheduler abstraction, test doubles.
pub mod advanced;
/// Convenience re-exports for common (sync) usage.
pub mod prelude;
/// Convenience re-exports including async execution.
pub mod prelude_async;

pub use duration::Duration;
pub use error::RetryError;
pub use facade::{
    get, get_async, get_contextual, get_with_listeners, run, run_async, run_contextual,
    run_with_listeners,
};
pub use future::RetryFuture;
pub use policy::RetryPolicy;
