//! Serializable retry settings.

use crate::RetryPolicy;
use bulwark_error::PolicyError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The `[retry]` table of `bulwark.toml`.
///
/// Delays are whole milliseconds. Missing fields take the defaults shown
/// below.
///
/// ```toml
/// [retry]
/// max_attempts = 3
/// initial_delay_ms = 500
/// max_delay_ms = 30000
/// multiplier = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    initial_delay_ms: u64,

    /// Upper bound on any delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    max_delay_ms: u64,

    /// Backoff growth factor.
    #[serde(default = "default_multiplier")]
    multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Settings with explicit values.
    pub fn new(max_attempts: u32, initial_delay_ms: u64, max_delay_ms: u64, multiplier: f64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            max_delay_ms,
            multiplier,
        }
    }

    /// Validate into a [`RetryPolicy`] without an override predicate.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] for out-of-range values.
    #[track_caller]
    pub fn to_policy(&self) -> Result<RetryPolicy, PolicyError> {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.multiplier,
        )
    }
}
