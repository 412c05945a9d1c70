//! Error types for the Bulwark provider resilience layer.
//!
//! # Error Hierarchy
//!
//! - [`ProviderError`] is the failure taxonomy: every failed provider call is
//!   reduced to one of the [`ProviderErrorKind`] variants.
//! - Crate-level errors ([`RateLimitError`], [`PolicyError`], [`ConfigError`])
//!   follow the `*ErrorKind` enum + wrapper struct pattern with
//!   `#[track_caller]` location capture.
//! - [`BulwarkError`] wraps any of the above.
//!
//! # Examples
//!
//! ```
//! use bulwark_error::{BulwarkResult, ProviderError};
//!
//! fn call_provider() -> BulwarkResult<String> {
//!     Err(ProviderError::transient("connection reset"))?
//! }
//!
//! assert!(call_provider().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod policy;
mod provider;
mod rate_limit;

pub use config::{ConfigError, ConfigErrorKind};
pub use error::{BulwarkError, BulwarkErrorKind, BulwarkResult};
pub use policy::{PolicyError, PolicyErrorKind};
pub use provider::{ProviderError, ProviderErrorKind, RetryableError};
pub use rate_limit::{RateLimitError, RateLimitErrorKind};
