//! Tests for limiter settings and default limits.

use bulwark_error::ConfigErrorKind;
use bulwark_rate_limit::{DefaultLimits, LimiterSettings, ProviderLimits, RateLimiter};
use std::collections::HashMap;
use std::time::Duration;

fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_empty_map_uses_defaults() {
    let parsed = LimiterSettings::from_map(&settings(&[("api_key_env", "OPENAI_API_KEY")])).unwrap();
    assert!(matches!(parsed, LimiterSettings::Default));
}

#[test]
fn test_explicit_pair_is_parsed() {
    let parsed =
        LimiterSettings::from_map(&settings(&[("max_requests", "10"), ("window_ms", "1000")]))
            .unwrap();
    match parsed {
        LimiterSettings::Explicit {
            max_requests,
            window,
        } => {
            assert_eq!(max_requests, 10);
            assert_eq!(window, Duration::from_secs(1));
        }
        other => panic!("expected explicit settings, got {:?}", other),
    }
}

#[test]
fn test_half_a_pair_is_rejected() {
    let err = LimiterSettings::from_map(&settings(&[("max_requests", "10")])).unwrap_err();
    assert!(matches!(
        err.kind,
        ConfigErrorKind::InvalidSetting { ref key, .. } if key == "window_ms"
    ));

    let err = LimiterSettings::from_map(&settings(&[("window_ms", "1000")])).unwrap_err();
    assert!(matches!(
        err.kind,
        ConfigErrorKind::InvalidSetting { ref key, .. } if key == "max_requests"
    ));
}

#[test]
fn test_unparsable_values_are_rejected() {
    let err = LimiterSettings::from_map(&settings(&[("max_requests", "ten"), ("window_ms", "1000")]))
        .unwrap_err();
    assert!(err.to_string().contains("max_requests"));

    let err = LimiterSettings::from_map(&settings(&[("max_requests", "10"), ("window_ms", "-5")]))
        .unwrap_err();
    assert!(err.to_string().contains("window_ms"));
}

#[test]
fn test_resolve_explicit_builds_limiter() {
    let limiter = LimiterSettings::Explicit {
        max_requests: 5,
        window: Duration::from_secs(10),
    }
    .resolve("anything", &DefaultLimits::default())
    .unwrap()
    .unwrap();
    assert_eq!(limiter.capacity(), 5);
    assert_eq!(limiter.window(), Duration::from_secs(10));
}

#[test]
fn test_resolve_explicit_zero_is_invalid() {
    let result = LimiterSettings::Explicit {
        max_requests: 0,
        window: Duration::from_secs(1),
    }
    .resolve("openai", &DefaultLimits::builtin());
    assert!(result.is_err());
}

#[test]
fn test_resolve_default_uses_table() {
    let limiter = LimiterSettings::Default
        .resolve("OpenAI", &DefaultLimits::builtin())
        .unwrap()
        .unwrap();
    assert_eq!(limiter.capacity(), 500);
    assert_eq!(limiter.window(), Duration::from_secs(60));
}

#[test]
fn test_resolve_unknown_provider_has_no_limiter() {
    let resolved = LimiterSettings::Default
        .resolve("my-local-llama", &DefaultLimits::builtin())
        .unwrap();
    assert!(resolved.is_none());
}

#[test]
fn test_resolve_prebuilt_shares_bucket() {
    let shared = RateLimiter::new(1, Duration::from_secs(60)).unwrap();
    let resolved = LimiterSettings::Prebuilt(shared.clone())
        .resolve("openai", &DefaultLimits::builtin())
        .unwrap()
        .unwrap();

    assert!(resolved.try_acquire());
    assert!(!shared.try_acquire());
}

#[test]
fn test_default_limits_deserialize_from_toml() {
    let limits: DefaultLimits = toml::from_str(
        r#"
        [providers.openai]
        requests_per_minute = 3000

        [providers.ollama]
        requests_per_minute = 0
        "#,
    )
    .unwrap();

    assert_eq!(
        limits.providers.get("openai"),
        Some(&ProviderLimits {
            requests_per_minute: 3000
        })
    );
    let merged = DefaultLimits::builtin().merge(&limits);
    assert_eq!(merged.requests_per_minute("openai"), Some(3000));
    assert_eq!(merged.requests_per_minute("ollama"), None);
}
