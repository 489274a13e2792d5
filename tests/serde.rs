#![cfg(feature = "serde")]
//! Coverage of the `serde` feature: the plain-data types emitted during a
//! retry (durations, terminal errors, attempt/outcome events) round-trip
//! through JSON so they can be logged or shipped to an external system.

use retry_rail::invocation::InvocationStats;
use retry_rail::listener::AttemptContext;
use retry_rail::Duration;

#[test]
fn duration_round_trips_through_json() {
    let original = Duration::from_millis(250);
    let json = serde_json::to_string(&original).unwrap();
    let restored: Duration = serde_json::from_str(&json).unwrap();
    assert_eq!(original, restored);
}

#[test]
fn attempt_context_round_trips_through_json() {
    let ctx: AttemptContext<u32, String> = AttemptContext {
        attempt: 2,
        elapsed: Duration::from_millis(50),
        result: None,
        failure: Some("transient".to_string()),
    };
    let json = serde_json::to_string(&ctx).unwrap();
    let restored: AttemptContext<u32, String> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.attempt, 2);
    assert_eq!(restored.failure, Some("transient".to_string()));
}

#[test]
fn invocation_stats_round_trip_through_json() {
    let stats = InvocationStats::default();
    let json = serde_json::to_string(&stats).unwrap();
    let restored: InvocationStats = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.attempts(), stats.attempts());
}
