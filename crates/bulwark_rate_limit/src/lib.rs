//! Per-provider rate limiting.
//!
//! Each provider binding owns one [`RateLimiter`], a token bucket that admits
//! callers in strict arrival order. Where a limiter comes from is decided by
//! [`LimiterSettings`]: a prebuilt instance, an explicit
//! `(max_requests, window)` pair, or the provider's entry in
//! [`DefaultLimits`]. Providers without an entry get no limiter.
//!
//! ```no_run
//! use bulwark_rate_limit::{DefaultLimits, LimiterSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let defaults = DefaultLimits::builtin();
//! if let Some(limiter) = LimiterSettings::Default.resolve("openai", &defaults)? {
//!     limiter.acquire().await?;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod defaults;
mod limiter;
mod settings;

pub use defaults::{DefaultLimits, ProviderLimits};
pub use limiter::RateLimiter;
pub use settings::LimiterSettings;
