//! Bulwark - resilience for AI provider calls
//!
//! Bulwark sits between a provider client and the network. Each call is
//! admitted by a per-provider token-bucket rate limiter, any failure is
//! classified into a small provider-agnostic taxonomy, and retryable failures
//! are retried with jittered exponential backoff that honours `Retry-After`.
//!
//! # Quick Start
//!
//! ```no_run
//! use bulwark::{BulwarkConfig, Failure, LimiterSettings, ProviderBinding, ResponseSnapshot};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BulwarkConfig::load()?;
//! let binding = ProviderBinding::from_config("openai", &config, LimiterSettings::Default)?;
//!
//! let client = reqwest::Client::new();
//! let models = binding
//!     .call(|| async {
//!         let response = client.get("https://api.openai.com/v1/models").send().await?;
//!         if !response.status().is_success() {
//!             return Err(Failure::from(ResponseSnapshot::from_reqwest(response).await));
//!         }
//!         Ok::<_, Failure>(response.text().await?)
//!     })
//!     .await?;
//! println!("{}", models);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `bulwark_error` - Error taxonomy and crate error types
//! - `bulwark_classify` - Failure classification
//! - `bulwark_rate_limit` - Token-bucket rate limiter and default limits
//! - `bulwark_retry` - Retry policy and retry handler
//!
//! This crate re-exports everything and adds configuration loading, the
//! [`ProviderBinding`] that wires the pieces together, and logging setup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod binding;
mod config;
mod observability;

pub use binding::ProviderBinding;
pub use config::BulwarkConfig;
pub use observability::{ObservabilityConfig, init_logging};

pub use bulwark_classify::{
    ErrorDetails, Failure, HttpResponse, ResponseSnapshot, TransportFailure,
    TransportFailureKind, classify, classify_at, classify_response, classify_transport,
    extract_details, parse_retry_after, retry_after_from,
};
pub use bulwark_error::{
    BulwarkError, BulwarkErrorKind, BulwarkResult, ConfigError, ConfigErrorKind, PolicyError,
    PolicyErrorKind, ProviderError, ProviderErrorKind, RateLimitError, RateLimitErrorKind,
    RetryableError,
};
pub use bulwark_rate_limit::{DefaultLimits, LimiterSettings, ProviderLimits, RateLimiter};
pub use bulwark_retry::{
    RetryConfig, RetryHandler, RetryOnCodes, RetryPolicy, RetryPolicyBuilder, RetryPredicate,
};
