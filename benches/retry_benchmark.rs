use criterion::{criterion_group, criterion_main, Criterion};
use retry_rail::invocation::{compute_wait, Invocation};
use retry_rail::{get, Duration, RetryPolicy};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

struct BenchClock;

impl retry_rail::clock::Clock for BenchClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

fn backoff_policy() -> RetryPolicy<u32, &'static str> {
    RetryPolicy::new()
        .with_backoff(Duration::from_millis(10), Duration::from_millis(5000))
        .with_max_retries(-1)
        .build()
        .unwrap()
}

fn bench_policy_evaluation(c: &mut Criterion) {
    let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new()
        .retry_on_failure_predicate(|f| *f == "transient")
        .build()
        .unwrap();
    c.bench_function("policy_allows_retries_for", |b| {
        b.iter(|| black_box(policy.allows_retries_for(None, Some(&"transient"))))
    });
}

fn bench_backoff_wait_computation(c: &mut Criterion) {
    let policy = backoff_policy();
    c.bench_function("compute_wait_backoff", |b| {
        b.iter(|| black_box(compute_wait(&policy, black_box(6), Duration::NONE)))
    });
}

fn bench_invocation_decide_cycle(c: &mut Criterion) {
    c.bench_function("invocation_begin_trial_and_decide", |b| {
        b.iter(|| {
            let mut invocation = Invocation::new(backoff_policy(), Arc::new(BenchClock));
            invocation.begin_trial();
            black_box(invocation.decide(None, Some(&"transient")))
        })
    });
}

fn bench_blocking_get_immediate_success(c: &mut Criterion) {
    c.bench_function("get_immediate_success", |b| {
        b.iter(|| {
            let policy: RetryPolicy<u32, &'static str> = RetryPolicy::new().build().unwrap();
            black_box(get(policy, || Ok::<_, &'static str>(1)))
        })
    });
}

criterion_group!(
    benches,
    bench_policy_evaluation,
    bench_backoff_wait_computation,
    bench_invocation_decide_cycle,
    bench_blocking_get_immediate_success,
);
criterion_main!(benches);
