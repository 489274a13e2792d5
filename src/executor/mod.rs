//! The two ways a [`crate::policy::RetryPolicy`] gets executed against an
//! operation: a blocking loop on the calling thread, or an
//! automatically-driven [`crate::future::RetryFuture`] that a caller can
//! instead drive contextually, trial by trial.

mod async_executor;
mod sync_executor;

pub use async_executor::{drive_automatic, get_async, run_async};
pub use sync_executor::execute;
