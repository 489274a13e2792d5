//! Intermediate API level for service developers.
//!
//! Adds async execution, listener registration, and the condition/category
//! helpers needed to express "retry on these kinds of failures" policies —
//! the level most service code should reach for.

pub use crate::facade::{get_async, get_with_listeners, run_async, run_with_listeners};
pub use crate::future::RetryFuture;
pub use crate::listener::{AttemptContext, ListenerRegistry, Outcome};
pub use crate::policy::{FailureCategory, FailureCategoryId};
