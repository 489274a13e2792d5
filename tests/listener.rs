//! End-to-end coverage of listener registration on [`RetryFuture`]: ordering
//! of `failedAttempt`/`retry`/`success`/`failure`/`complete` events, and the
//! "fire immediately if already resolved" guarantee on the terminal
//! listeners.

use retry_rail::advanced::{get_contextual_with_clock, VirtualClock};
use retry_rail::listener::ListenerRegistry;
use retry_rail::{get_with_listeners, Duration, RetryPolicy};
use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn failed_attempt_and_retry_fire_before_eventual_success() {
    let clock = Arc::new(VirtualClock::new());
    let policy: RetryPolicy<u32, &'static str> =
        RetryPolicy::new().with_max_retries(-1).build().unwrap();
    let future = get_contextual_with_clock(policy, clock);

    let failed_attempts = Arc::new(AtomicU32::new(0));
    let retries = Arc::new(AtomicU32::new(0));
    let successes = Arc::new(AtomicU32::new(0));
    let completions = Arc::new(AtomicU32::new(0));

    let fa = failed_attempts.clone();
    future.on_failed_attempt(move |_| {
        fa.fetch_add(1, Ordering::SeqCst);
    });
    let r = retries.clone();
    future.on_retry(move |_| {
        r.fetch_add(1, Ordering::SeqCst);
    });
    let s = successes.clone();
    future.on_success(move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    });
    let c = completions.clone();
    future.on_complete(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    let first = future.begin_trial();
    future.record_failure(first, "transient");
    let second = future.begin_trial();
    future.record_result(second, 5);

    assert_eq!(future.get(), Ok(5));
    assert_eq!(failed_attempts.load(Ordering::SeqCst), 1);
    assert_eq!(retries.load(Ordering::SeqCst), 1);
    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn on_failure_attached_after_resolution_fires_immediately() {
    let clock = Arc::new(VirtualClock::new());
    let policy: RetryPolicy<u32, &'static str> =
        RetryPolicy::new().with_max_retries(0).build().unwrap();
    let future = get_contextual_with_clock(policy, clock);

    let trial = future.begin_trial();
    future.record_failure(trial, "fatal");
    assert!(future.is_done());

    let seen = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();
    future.on_failure(move |outcome| {
        *seen_clone.lock().unwrap() = Some(format!("{outcome:?}"));
    });

    assert!(seen.lock().unwrap().is_some());
}

#[test]
fn failure_listener_does_not_fire_on_eventual_success() {
    let clock = Arc::new(VirtualClock::new());
    let policy: RetryPolicy<u32, &'static str> =
        RetryPolicy::new().with_max_retries(-1).build().unwrap();
    let future = get_contextual_with_clock(policy, clock);

    let failure_fired = Arc::new(AtomicU32::new(0));
    let f = failure_fired.clone();
    future.on_failure(move |_| {
        f.fetch_add(1, Ordering::SeqCst);
    });

    let trial = future.begin_trial();
    future.record_result(trial, 1);

    assert_eq!(future.get(), Ok(1));
    assert_eq!(failure_fired.load(Ordering::SeqCst), 0);
}

#[test]
fn sync_success_after_two_failures_fires_listeners_through_get_with_listeners() {
    let policy: RetryPolicy<&'static str, &'static str> = RetryPolicy::new().build().unwrap();

    let mut listeners = ListenerRegistry::new();
    let failed_attempts = Arc::new(AtomicU32::new(0));
    let retries = Arc::new(AtomicU32::new(0));
    let successes = Arc::new(AtomicU32::new(0));
    let completions = Arc::new(AtomicU32::new(0));

    let fa = failed_attempts.clone();
    listeners.on_failed_attempt(move |_| {
        fa.fetch_add(1, Ordering::SeqCst);
    });
    let r = retries.clone();
    listeners.on_retry(move |_| {
        r.fetch_add(1, Ordering::SeqCst);
    });
    let s = successes.clone();
    listeners.on_success(move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    });
    let c = completions.clone();
    listeners.on_complete(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    let attempts = Cell::new(0);
    let result = get_with_listeners(policy, &listeners, || {
        attempts.set(attempts.get() + 1);
        if attempts.get() <= 2 {
            Err("connect failure")
        } else {
            Ok("ok")
        }
    });

    assert_eq!(result, Ok("ok"));
    assert_eq!(failed_attempts.load(Ordering::SeqCst), 2);
    assert_eq!(retries.load(Ordering::SeqCst), 2);
    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn sync_exhaustion_on_a_legal_result_skips_success_but_still_completes() {
    let policy: RetryPolicy<bool, &'static str> = RetryPolicy::new()
        .retry_on_result(false)
        .with_max_retries(3)
        .build()
        .unwrap();

    let mut listeners = ListenerRegistry::new();
    let failed_attempts = Arc::new(AtomicU32::new(0));
    let retries = Arc::new(AtomicU32::new(0));
    let successes = Arc::new(AtomicU32::new(0));
    let failures = Arc::new(AtomicU32::new(0));
    let completions = Arc::new(AtomicU32::new(0));

    let fa = failed_attempts.clone();
    listeners.on_failed_attempt(move |_| {
        fa.fetch_add(1, Ordering::SeqCst);
    });
    let r = retries.clone();
    listeners.on_retry(move |_| {
        r.fetch_add(1, Ordering::SeqCst);
    });
    let s = successes.clone();
    listeners.on_success(move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    });
    let fl = failures.clone();
    listeners.on_failure(move |_| {
        fl.fetch_add(1, Ordering::SeqCst);
    });
    let c = completions.clone();
    listeners.on_complete(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    let trials = Cell::new(0);
    let result = get_with_listeners::<bool, &'static str>(policy, &listeners, || {
        trials.set(trials.get() + 1);
        Ok(false)
    });

    assert_eq!(result, Ok(false));
    assert_eq!(trials.get(), 4);
    assert_eq!(failed_attempts.load(Ordering::SeqCst), 4);
    assert_eq!(retries.load(Ordering::SeqCst), 3);
    assert_eq!(successes.load(Ordering::SeqCst), 0);
    assert_eq!(failures.load(Ordering::SeqCst), 0);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}
