//! Tests for the `[retry]` configuration table.

use bulwark_error::PolicyErrorKind;
use bulwark_retry::RetryConfig;
use std::time::Duration;

#[test]
fn test_full_table_parses() {
    let config: RetryConfig = toml::from_str(
        r#"
        max_attempts = 5
        initial_delay_ms = 250
        max_delay_ms = 8000
        multiplier = 1.5
        "#,
    )
    .unwrap();

    assert_eq!(*config.max_attempts(), 5);
    assert_eq!(*config.initial_delay_ms(), 250);

    let policy = config.to_policy().unwrap();
    assert_eq!(policy.initial_delay(), Duration::from_millis(250));
    assert_eq!(policy.max_delay(), Duration::from_secs(8));
    assert_eq!(policy.multiplier(), 1.5);
}

#[test]
fn test_missing_fields_take_defaults() {
    let config: RetryConfig = toml::from_str("max_attempts = 4").unwrap();
    assert_eq!(*config.max_attempts(), 4);
    assert_eq!(*config.initial_delay_ms(), 500);
    assert_eq!(*config.max_delay_ms(), 30_000);
    assert_eq!(*config.multiplier(), 2.0);
}

#[test]
fn test_unknown_fields_are_rejected() {
    let result: Result<RetryConfig, _> = toml::from_str("max_retries = 4");
    assert!(result.is_err());
}

#[test]
fn test_invalid_values_fail_validation() {
    let err = RetryConfig::new(0, 100, 1000, 2.0).to_policy().unwrap_err();
    assert_eq!(err.kind(), &PolicyErrorKind::MaxAttempts(0));

    let err = RetryConfig::new(3, 5000, 1000, 2.0).to_policy().unwrap_err();
    assert!(matches!(err.kind(), PolicyErrorKind::DelayOrder { .. }));
}
