//! Retries for provider calls.
//!
//! [`RetryPolicy`] decides whether a classified failure may be retried and how
//! long to wait first: exponential backoff with up to 10% jitter, capped at a
//! maximum delay. [`RetryHandler`] runs an operation under a policy, classifying
//! each failure, honouring quota `retry_after` hints, and surfacing the last
//! failure once attempts run out.
//!
//! ```no_run
//! use bulwark_error::ProviderError;
//! use bulwark_retry::{RetryHandler, RetryPolicy};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(4)
//!     .initial_delay(Duration::from_millis(250))
//!     .build()?;
//! let handler = RetryHandler::new(policy).with_provider("openai");
//!
//! let reply = handler
//!     .execute(|| async { Ok::<_, ProviderError>("hello".to_string()) })
//!     .await?;
//! assert_eq!(reply, "hello");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod handler;
mod policy;
mod predicate;

pub use config::RetryConfig;
pub use handler::RetryHandler;
pub use policy::{RetryPolicy, RetryPolicyBuilder};
pub use predicate::{RetryOnCodes, RetryPredicate};
