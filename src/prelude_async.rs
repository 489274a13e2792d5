//! Async prelude — everything from [`prelude`](crate::prelude) plus the
//! `async`-gated execution surface.
//!
//! # Usage
//!
//! ```
//! use retry_rail::prelude_async::*;
//!
//! let policy = RetryPolicy::new().build().unwrap();
//! let future = get_async(policy, || Ok::<_, &'static str>(1));
//! assert_eq!(future.get(), Ok(1));
//! ```
//!
//! # What's Included
//!
//! ## From the sync prelude
//!
//! - **Types**: [`RetryPolicy`], [`RetryError`], [`Duration`]
//! - **Sync entry points**: [`run`], [`get`]
//!
//! ## Async-specific
//!
//! - [`get_async`], [`run_async`] — automatic-mode execution
//! - [`RetryFuture`] — the cancellable, awaitable handle they return

pub use crate::prelude::*;

pub use crate::facade::{get_async, run_async};
pub use crate::future::RetryFuture;
