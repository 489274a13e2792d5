//! Blocking retry loop: runs the operation and sleeps between
//! attempts on the calling thread.

use std::sync::Arc;
use std::thread;

use crate::clock::Clock;
use crate::error::RetryError;
use crate::invocation::{terminal_failure_error, Decision, Invocation, StopReason};
use crate::listener::{AttemptContext, ListenerRegistry, Outcome};
use crate::policy::RetryPolicy;

/// Runs `operation` to completion against `policy` on the calling thread,
/// consulting `listeners` for every attempt and terminal event.
pub fn execute<T, F>(
    policy: RetryPolicy<T, F>,
    clock: Arc<dyn Clock>,
    listeners: &ListenerRegistry<T, F>,
    mut operation: impl FnMut() -> Result<T, F>,
) -> Result<T, RetryError<F>>
where
    T: Clone + PartialEq,
    F: Clone,
{
    let mut invocation = Invocation::new(policy, clock);

    loop {
        invocation.begin_trial();

        match operation() {
            Ok(value) => {
                let decision = invocation.decide(Some(&value), None);
                let stats = invocation.stats();
                match decision {
                    Decision::Stop(reason) => {
                        let accepted = reason == StopReason::ConditionRejected;
                        #[cfg(feature = "tracing")]
                        tracing::debug!(attempt = stats.attempts(), accepted, "retry stopped with a result");
                        if !accepted {
                            let ctx = AttemptContext {
                                attempt: stats.attempts(),
                                elapsed: stats.elapsed(),
                                result: Some(value.clone()),
                                failure: None,
                            };
                            listeners.fire_failed_attempt(&ctx);
                        }
                        let outcome = Outcome::Success { value, accepted };
                        listeners.fire_terminal(&outcome);
                        return outcome.into_result();
                    },
                    Decision::Retry(wait) => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!(attempt = stats.attempts(), wait_ms = wait.as_millis(), "result rejected, retrying");
                        let ctx = AttemptContext {
                            attempt: stats.attempts(),
                            elapsed: stats.elapsed(),
                            result: Some(value),
                            failure: None,
                        };
                        listeners.fire_failed_attempt(&ctx);
                        listeners.fire_retry(&ctx);
                        sleep(wait);
                    },
                }
            },
            Err(failure) => {
                let decision = invocation.decide(None, Some(&failure));
                let stats = invocation.stats();
                let ctx = AttemptContext {
                    attempt: stats.attempts(),
                    elapsed: stats.elapsed(),
                    result: None,
                    failure: Some(failure.clone()),
                };
                listeners.fire_failed_attempt(&ctx);
                match decision {
                    Decision::Retry(wait) => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!(attempt = stats.attempts(), wait_ms = wait.as_millis(), "attempt failed, retrying");
                        listeners.fire_retry(&ctx);
                        sleep(wait);
                    },
                    Decision::Stop(reason) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(attempt = stats.attempts(), ?reason, "retry terminated");
                        let error =
                            terminal_failure_error(reason, stats.attempts(), stats.elapsed(), failure);
                        let outcome = Outcome::Failure(error);
                        listeners.fire_terminal(&outcome);
                        return outcome.into_result();
                    },
                }
            },
        }
    }
}

fn sleep(wait: crate::duration::Duration) {
    if !wait.is_none() {
        thread::sleep(wait.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::duration::Duration;
    use std::cell::Cell;

    #[test]
    fn succeeds_on_first_try_without_sleeping() {
        let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new().build().unwrap();
        let listeners = ListenerRegistry::new();
        let result = execute(policy, Arc::new(SystemClock), &listeners, || Ok::<_, &'static str>(5));
        assert_eq!(result, Ok(5));
    }

    #[test]
    fn retries_then_succeeds() {
        let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new()
            .with_delay(Duration::from_millis(1))
            .build()
            .unwrap();
        let listeners = ListenerRegistry::new();
        let attempts = Cell::new(0);
        let result = execute(policy, Arc::new(SystemClock), &listeners, || {
            attempts.set(attempts.get() + 1);
            if attempts.get() < 3 {
                Err("retry me")
            } else {
                Ok(99)
            }
        });
        assert_eq!(result, Ok(99));
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn non_retryable_failure_surfaces_as_operation_failure() {
        let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new()
            .retry_on_failure_predicate(|_| false)
            .build()
            .unwrap();
        let listeners = ListenerRegistry::new();
        let result = execute(policy, Arc::new(SystemClock), &listeners, || Err::<u32, _>("fatal"));
        assert!(matches!(result, Err(RetryError::OperationFailure("fatal"))));
    }
}
