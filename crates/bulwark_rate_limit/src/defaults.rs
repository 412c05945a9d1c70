//! Provider-keyed default request budgets.
//!
//! Used when a provider binding supplies no limiter settings of its own. The
//! built-in figures are conservative entry-tier requests-per-minute limits;
//! configuration can override or extend them.

use crate::RateLimiter;
use bulwark_error::RateLimitError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Built-in requests-per-minute table.
const BUILTIN_RPM: [(&str, u32); 6] = [
    ("anthropic", 50), // Tier 1
    ("cohere", 100),   // Production key
    ("gemini", 60),    // Pay-as-you-go Flash
    ("groq", 30),      // Free tier
    ("mistral", 60),   // 1 request/second
    ("openai", 500),   // Tier 1
];

/// Request budget for one provider.
///
/// # Example
///
/// ```toml
/// [rate_limits.providers.openai]
/// requests_per_minute = 500
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ProviderLimits {
    /// Requests per minute. Zero disables limiting for the provider.
    pub requests_per_minute: u32,
}

/// Provider-keyed table of default request budgets.
///
/// Provider ids are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct DefaultLimits {
    /// Map of lowercase provider id to its budget
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderLimits>,
}

impl DefaultLimits {
    /// The built-in table.
    pub fn builtin() -> Self {
        let providers = BUILTIN_RPM
            .iter()
            .map(|(provider, rpm)| {
                (
                    (*provider).to_string(),
                    ProviderLimits {
                        requests_per_minute: *rpm,
                    },
                )
            })
            .collect();
        Self { providers }
    }

    /// Overlay `overrides` on this table; entries in `overrides` win.
    pub fn merge(&self, overrides: &DefaultLimits) -> DefaultLimits {
        let mut providers = self.providers.clone();
        for (provider, limits) in &overrides.providers {
            providers.insert(provider.to_ascii_lowercase(), *limits);
        }
        DefaultLimits { providers }
    }

    /// Requests per minute for `provider`, or `None` if it has no budget.
    pub fn requests_per_minute(&self, provider: &str) -> Option<u32> {
        self.providers
            .get(&provider.to_ascii_lowercase())
            .map(|limits| limits.requests_per_minute)
            .filter(|rpm| *rpm > 0)
    }

    /// Build a fresh limiter for `provider` from its table entry.
    ///
    /// Returns `Ok(None)` for providers without a budget.
    #[instrument(skip(self))]
    pub fn limiter_for(&self, provider: &str) -> Result<Option<RateLimiter>, RateLimitError> {
        let Some(rpm) = self.requests_per_minute(provider) else {
            debug!("No default rate limit for provider");
            return Ok(None);
        };
        debug!(rpm, "Using default rate limit");
        RateLimiter::per_minute(rpm).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_major_providers() {
        let limits = DefaultLimits::builtin();
        assert_eq!(limits.requests_per_minute("openai"), Some(500));
        assert_eq!(limits.requests_per_minute("Anthropic"), Some(50));
        assert_eq!(limits.requests_per_minute("my-local-llama"), None);
    }

    #[test]
    fn merge_overrides_and_disables() {
        let mut overrides = DefaultLimits::default();
        overrides.providers.insert(
            "OpenAI".to_string(),
            ProviderLimits {
                requests_per_minute: 0,
            },
        );
        overrides.providers.insert(
            "ollama".to_string(),
            ProviderLimits {
                requests_per_minute: 1000,
            },
        );

        let merged = DefaultLimits::builtin().merge(&overrides);
        assert_eq!(merged.requests_per_minute("openai"), None);
        assert_eq!(merged.requests_per_minute("ollama"), Some(1000));
        assert_eq!(merged.requests_per_minute("gemini"), Some(60));
    }
}
