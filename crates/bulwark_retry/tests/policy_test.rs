//! Tests for backoff schedule and retry eligibility.

use bulwark_error::{PolicyErrorKind, ProviderError};
use bulwark_retry::{RetryOnCodes, RetryPolicy};
use chrono::{TimeDelta, Utc};
use std::time::Duration;

fn doubling(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::builder()
        .max_attempts(max_attempts)
        .initial_delay(Duration::from_millis(100))
        .max_delay(Duration::from_secs(60))
        .multiplier(2.0)
        .build()
        .unwrap()
}

fn assert_between(delay: Duration, low_ms: u64, high_ms: u64) {
    assert!(
        delay >= Duration::from_millis(low_ms) && delay <= Duration::from_millis(high_ms),
        "{:?} not in [{}, {}]ms",
        delay,
        low_ms,
        high_ms
    );
}

#[test]
fn test_backoff_doubles_with_bounded_jitter() {
    let policy = doubling(5);
    // Jitter is random; sample enough to cover its range.
    for _ in 0..200 {
        assert_between(policy.next_delay(0), 100, 110);
        assert_between(policy.next_delay(1), 200, 220);
        assert_between(policy.next_delay(2), 400, 440);
    }
}

#[test]
fn test_backoff_never_exceeds_cap() {
    let policy = RetryPolicy::builder()
        .max_attempts(50)
        .initial_delay(Duration::from_millis(100))
        .max_delay(Duration::from_millis(1_000))
        .multiplier(3.0)
        .build()
        .unwrap();

    for attempt in 0..64 {
        assert!(policy.next_delay(attempt) <= Duration::from_millis(1_000));
    }
    assert_eq!(policy.next_delay(40), Duration::from_millis(1_000));
}

#[test]
fn test_jitter_near_cap_is_clamped() {
    // base 950ms + up to 95ms jitter, capped at 1s
    let policy = RetryPolicy::builder()
        .initial_delay(Duration::from_millis(950))
        .max_delay(Duration::from_millis(1_000))
        .build()
        .unwrap();
    for _ in 0..100 {
        assert_between(policy.next_delay(0), 950, 1_000);
    }
}

#[test]
fn test_default_retry_matrix() {
    let policy = doubling(3);
    let in_a_minute = Some(Utc::now() + TimeDelta::minutes(1));

    assert!(policy.can_retry(&ProviderError::transient("503"), 0));
    assert!(policy.can_retry(&ProviderError::quota("429", in_a_minute), 0));
    assert!(policy.can_retry(&ProviderError::quota("429", None), 1));
    assert!(!policy.can_retry(&ProviderError::auth("401"), 0));
    assert!(!policy.can_retry(&ProviderError::client("400"), 0));
    assert!(!policy.can_retry(&ProviderError::capability("no tools"), 0));
}

#[test]
fn test_budget_exhaustion_refuses_every_kind() {
    let policy = doubling(3);
    let errors = [
        ProviderError::transient("x"),
        ProviderError::quota("x", None),
        ProviderError::auth("x"),
        ProviderError::client("x"),
        ProviderError::capability("x"),
    ];
    for err in &errors {
        assert!(!policy.can_retry(err, 2), "{:?} retried at last attempt", err.kind());
        assert!(!policy.can_retry(err, 10));
    }
}

#[test]
fn test_single_attempt_policy_never_retries() {
    let policy = doubling(1);
    assert!(!policy.can_retry(&ProviderError::transient("x"), 0));
}

#[test]
fn test_predicate_can_force_retry() {
    let policy = doubling(3).with_predicate(RetryOnCodes::new(["overloaded_error"]));
    let overloaded = ProviderError::client("busy").with_code("overloaded_error");

    assert!(policy.can_retry(&overloaded, 0));
    assert!(!policy.can_retry(&ProviderError::client("bad json"), 0));
}

#[test]
fn test_predicate_cannot_block_default_retry() {
    let policy = RetryPolicy::builder()
        .max_attempts(3)
        .predicate(|_: &ProviderError| false)
        .build()
        .unwrap();

    assert!(policy.can_retry(&ProviderError::transient("reset"), 0));
}

#[test]
fn test_predicate_cannot_extend_budget() {
    let policy = doubling(2).with_predicate(|_: &ProviderError| true);
    assert!(policy.can_retry(&ProviderError::auth("x"), 0));
    assert!(!policy.can_retry(&ProviderError::auth("x"), 1));
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let err = RetryPolicy::builder().max_attempts(0).build().unwrap_err();
    assert_eq!(err.kind(), &PolicyErrorKind::MaxAttempts(0));

    let err = RetryPolicy::builder().multiplier(0.0).build().unwrap_err();
    assert!(matches!(err.kind(), PolicyErrorKind::Multiplier(_)));

    let err = RetryPolicy::builder().multiplier(f64::NAN).build().unwrap_err();
    assert!(matches!(err.kind(), PolicyErrorKind::Multiplier(_)));

    let err = RetryPolicy::builder()
        .initial_delay(Duration::from_secs(5))
        .max_delay(Duration::from_secs(1))
        .build()
        .unwrap_err();
    assert!(matches!(err.kind(), PolicyErrorKind::DelayOrder { .. }));
}
