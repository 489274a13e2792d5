//! Convenience re-exports for common usage patterns.
//!
//! Import everything with:
//!
//! ```
//! use retry_rail::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - **Types**: [`RetryPolicy`], [`RetryError`], [`Duration`]
//! - **Sync entry points**: [`run`], [`get`]
//! - **Condition helpers**: [`FailureCategory`], [`FailureCategoryId`]
//!
//! # Example
//!
//! ```
//! use retry_rail::prelude::*;
//!
//! let policy = RetryPolicy::new()
//!     .with_backoff(Duration::from_millis(10), Duration::from_millis(200))
//!     .with_max_retries(5)
//!     .build()
//!     .unwrap();
//!
//! let value = get(policy, || Ok::<_, &'static str>(7)).unwrap();
//! assert_eq!(value, 7);
//! ```

pub use crate::duration::Duration;
pub use crate::error::RetryError;
pub use crate::facade::{get, run};
pub use crate::policy::{FailureCategory, FailureCategoryId, RetryPolicy};
