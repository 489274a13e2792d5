//! Coverage of [`retry_rail::invocation`]'s wait-time computation and
//! budget-exhaustion bookkeeping, independent of any executor.

use retry_rail::advanced::VirtualClock;
use retry_rail::invocation::{compute_wait, Decision, Invocation, StopReason};
use retry_rail::{Duration, RetryPolicy};
use std::sync::Arc;

#[test]
fn fixed_delay_never_scales_between_attempts() {
    let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new()
        .with_delay(Duration::from_millis(25))
        .with_max_retries(-1)
        .build()
        .unwrap();

    assert_eq!(compute_wait(&policy, 1, Duration::NONE), Some(Duration::from_millis(25)));
    assert_eq!(compute_wait(&policy, 4, Duration::NONE), Some(Duration::from_millis(25)));
}

#[test]
fn backoff_multiplier_controls_growth_rate() {
    let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new()
        .with_backoff_multiplier(Duration::from_millis(10), Duration::from_millis(1000), 3.0)
        .with_max_retries(-1)
        .build()
        .unwrap();

    assert_eq!(compute_wait(&policy, 1, Duration::NONE), Some(Duration::from_millis(10)));
    assert_eq!(compute_wait(&policy, 2, Duration::NONE), Some(Duration::from_millis(30)));
    assert_eq!(compute_wait(&policy, 3, Duration::NONE), Some(Duration::from_millis(90)));
}

#[test]
fn invocation_distinguishes_exhausted_from_condition_rejected() {
    let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new()
        .retry_on_failure_predicate(|failure| *failure == "transient")
        .with_max_retries(5)
        .build()
        .unwrap();
    let mut invocation = Invocation::new(policy, Arc::new(VirtualClock::new()));

    invocation.begin_trial();
    assert!(matches!(
        invocation.decide(None, Some(&"permanent")),
        Decision::Stop(StopReason::ConditionRejected)
    ));
}

#[test]
fn invocation_stops_with_exhausted_once_max_retries_reached() {
    let policy: RetryPolicy<u32, &'static str> =
        RetryPolicy::new().with_max_retries(0).build().unwrap();
    let mut invocation = Invocation::new(policy, Arc::new(VirtualClock::new()));

    invocation.begin_trial();
    assert!(matches!(
        invocation.decide(None, Some(&"boom")),
        Decision::Stop(StopReason::Exhausted)
    ));
}

#[test]
fn invocation_tracks_attempt_count_and_last_wait() {
    let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new()
        .with_delay(Duration::from_millis(7))
        .with_max_retries(-1)
        .build()
        .unwrap();
    let mut invocation = Invocation::new(policy, Arc::new(VirtualClock::new()));

    invocation.begin_trial();
    invocation.decide(None, Some(&"retry me"));
    invocation.begin_trial();
    invocation.decide(None, Some(&"retry me"));

    let stats = invocation.stats();
    assert_eq!(stats.attempts(), 2);
    assert_eq!(stats.last_wait(), Duration::from_millis(7));
}
