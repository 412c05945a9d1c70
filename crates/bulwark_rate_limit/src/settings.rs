//! Where a provider binding's limiter comes from.

use crate::{DefaultLimits, RateLimiter};
use bulwark_error::{ConfigError, RateLimitError};
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::time::Duration;
use tracing::{debug, instrument};

/// Limiter source for one provider binding.
#[derive(Debug, Clone, Default)]
pub enum LimiterSettings {
    /// Use this limiter instance, possibly shared with other bindings.
    Prebuilt(RateLimiter),
    /// Build a limiter admitting `max_requests` per `window`.
    Explicit {
        /// Bucket capacity
        max_requests: u32,
        /// Accrual window
        window: Duration,
    },
    /// Look the provider up in the default table.
    #[default]
    Default,
}

impl LimiterSettings {
    /// Settings-map key for the request budget.
    pub const MAX_REQUESTS_KEY: &'static str = "max_requests";

    /// Settings-map key for the window, in milliseconds.
    pub const WINDOW_MS_KEY: &'static str = "window_ms";

    /// Read settings from a plain provider settings map.
    ///
    /// Both `max_requests` and `window_ms` present gives `Explicit`; both
    /// absent gives `Default`. Other keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns an invalid-setting error when only one of the pair is present
    /// or a value is not a non-negative integer.
    ///
    /// # Example
    ///
    /// ```
    /// use bulwark_rate_limit::LimiterSettings;
    /// use std::collections::HashMap;
    ///
    /// let map = HashMap::from([
    ///     ("max_requests".to_string(), "10".to_string()),
    ///     ("window_ms".to_string(), "1000".to_string()),
    /// ]);
    /// assert!(matches!(
    ///     LimiterSettings::from_map(&map).unwrap(),
    ///     LimiterSettings::Explicit { max_requests: 10, .. }
    /// ));
    /// ```
    pub fn from_map<S: BuildHasher>(
        map: &HashMap<String, String, S>,
    ) -> Result<Self, ConfigError> {
        let max_requests = map.get(Self::MAX_REQUESTS_KEY);
        let window_ms = map.get(Self::WINDOW_MS_KEY);

        match (max_requests, window_ms) {
            (None, None) => Ok(LimiterSettings::Default),
            (Some(max_requests), Some(window_ms)) => {
                let max_requests = max_requests.trim().parse::<u32>().map_err(|e| {
                    ConfigError::invalid_setting(Self::MAX_REQUESTS_KEY, e.to_string())
                })?;
                let window_ms = window_ms.trim().parse::<u64>().map_err(|e| {
                    ConfigError::invalid_setting(Self::WINDOW_MS_KEY, e.to_string())
                })?;
                Ok(LimiterSettings::Explicit {
                    max_requests,
                    window: Duration::from_millis(window_ms),
                })
            }
            (Some(_), None) => Err(ConfigError::invalid_setting(
                Self::WINDOW_MS_KEY,
                "required when max_requests is set",
            )),
            (None, Some(_)) => Err(ConfigError::invalid_setting(
                Self::MAX_REQUESTS_KEY,
                "required when window_ms is set",
            )),
        }
    }

    /// Produce the limiter for `provider`, if it should have one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when explicit or default figures are zero-sized.
    #[instrument(skip(self, defaults))]
    pub fn resolve(
        &self,
        provider: &str,
        defaults: &DefaultLimits,
    ) -> Result<Option<RateLimiter>, RateLimitError> {
        match self {
            LimiterSettings::Prebuilt(limiter) => {
                debug!(capacity = limiter.capacity(), "Using prebuilt rate limiter");
                Ok(Some(limiter.clone()))
            }
            LimiterSettings::Explicit {
                max_requests,
                window,
            } => {
                debug!(max_requests, ?window, "Using explicit rate limit");
                RateLimiter::new(*max_requests, *window).map(Some)
            }
            LimiterSettings::Default => defaults.limiter_for(provider),
        }
    }
}
