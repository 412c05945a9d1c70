//! Tests for the retry handler's attempt loop.
//!
//! Sleeps run on a paused clock.

use bulwark_classify::{ResponseSnapshot, TransportFailure};
use bulwark_error::{ProviderError, ProviderErrorKind};
use bulwark_retry::{RetryHandler, RetryPolicy};
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

fn handler(max_attempts: u32, initial_ms: u64) -> RetryHandler {
    let policy = RetryPolicy::builder()
        .max_attempts(max_attempts)
        .initial_delay(Duration::from_millis(initial_ms))
        .max_delay(Duration::from_secs(10))
        .multiplier(2.0)
        .build()
        .unwrap();
    RetryHandler::new(policy).with_provider("openai")
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_then_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let result = handler(3, 10)
        .execute(move || {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(ProviderError::transient("upstream reset"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_auth_failure_is_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let err = handler(5, 10)
        .execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ProviderError::auth("invalid api key")) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.kind(), &ProviderErrorKind::Auth);
    assert_eq!(err.message(), "invalid api key");
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_returns_last_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let err = handler(3, 10)
        .execute(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(ProviderError::transient(format!("failure {}", n))) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(err.message(), "failure 2");
}

#[tokio::test(start_paused = true)]
async fn test_last_failure_kind_wins() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let err = handler(5, 10)
        .execute(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err::<(), _>(ProviderError::transient("blip"))
                } else {
                    Err(ProviderError::client("context length exceeded"))
                }
            }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(err.kind(), &ProviderErrorKind::Client);
}

#[tokio::test(start_paused = true)]
async fn test_quota_hint_extends_wait() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let start = Instant::now();

    handler(3, 10)
        .execute(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    let at = Utc::now() + TimeDelta::milliseconds(200);
                    Err(ProviderError::quota("slow down", Some(at)))
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(190), "waited {:?}", elapsed);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_past_quota_hint_uses_backoff() {
    let start = Instant::now();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    handler(3, 10)
        .execute(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    let at = Utc::now() - TimeDelta::seconds(30);
                    Err(ProviderError::quota("slow down", Some(at)))
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(10), "waited {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(20), "waited {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_between_attempts() {
    let start = Instant::now();

    let _ = handler(3, 100)
        .execute(|| async { Err::<(), _>(ProviderError::transient("down")) })
        .await;

    // 100ms then 200ms, each with up to 10% jitter.
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300), "waited {:?}", elapsed);
    assert!(elapsed <= Duration::from_millis(332), "waited {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_raw_http_failures_are_classified() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let err = handler(2, 10)
        .execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ResponseSnapshot::new(503).with_header("x-request-id", "abc")) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(err.kind(), &ProviderErrorKind::Transient);
    assert_eq!(err.provider(), Some("openai"));
    assert_eq!(err.correlation_id(), Some("abc"));
}

#[tokio::test(start_paused = true)]
async fn test_transport_timeout_is_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let value = handler(3, 10)
        .execute(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(TransportFailure::timeout("read timed out"))
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, 42);
}

#[tokio::test(start_paused = true)]
async fn test_opaque_failures_are_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let err = handler(3, 10)
        .execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(std::io::Error::other("unexpected state")) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.kind(), &ProviderErrorKind::Client);
}
