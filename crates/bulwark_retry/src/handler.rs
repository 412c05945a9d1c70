//! Attempt loop for a single logical provider call.

use crate::RetryPolicy;
use bulwark_classify::{Failure, classify};
use bulwark_error::ProviderError;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Provider id used when none is configured.
const UNKNOWN_PROVIDER: &str = "unknown";

/// Runs operations under a [`RetryPolicy`].
///
/// Attempts of one `execute` call run strictly one after another. Separate
/// `execute` calls share nothing but the policy and may run concurrently.
#[derive(Debug, Clone)]
pub struct RetryHandler {
    policy: RetryPolicy,
    provider: String,
}

impl RetryHandler {
    /// Create a handler for `policy`.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            provider: UNKNOWN_PROVIDER.to_string(),
        }
    }

    /// Tag classified failures with `provider`.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// The policy in force.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Provider id attached to classified failures.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Run `operation` until it succeeds or the policy refuses another attempt.
    ///
    /// Every failure is classified into a [`ProviderError`]. Between attempts
    /// the handler sleeps for the policy's backoff delay, stretched to honour a
    /// quota error's `retry_after` when that lies in the future.
    ///
    /// # Errors
    ///
    /// Returns the failure of the last attempt made.
    ///
    /// # Example
    ///
    /// ```
    /// use bulwark_error::ProviderError;
    /// use bulwark_retry::{RetryHandler, RetryPolicy};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let handler = RetryHandler::new(RetryPolicy::default());
    /// let err = handler
    ///     .execute(|| async { Err::<(), _>(ProviderError::auth("bad key")) })
    ///     .await
    ///     .unwrap_err();
    /// assert_eq!(err.message(), "bad key");
    /// # }
    /// ```
    #[instrument(
        skip(self, operation),
        fields(provider = %self.provider, max_attempts = self.policy.max_attempts())
    )]
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        let mut attempt: u32 = 0;
        loop {
            let failure = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(attempts = attempt + 1, "Succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(failure) => failure,
            };

            let error = classify(failure, &self.provider);
            if !self.policy.can_retry(&error, attempt) {
                warn!(
                    attempt,
                    kind = error.kind().name(),
                    error = %error,
                    "Not retrying provider failure"
                );
                return Err(error);
            }

            let delay = self.delay_for(&error, attempt, Utc::now());
            warn!(
                attempt,
                kind = error.kind().name(),
                delay_ms = delay.as_millis() as u64,
                "Retrying provider call"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Backoff for `attempt`, or the remaining quota wait if that is longer.
    fn delay_for(&self, error: &ProviderError, attempt: u32, now: DateTime<Utc>) -> Duration {
        let computed = self.policy.next_delay(attempt);
        match error.retry_after() {
            Some(at) if at > now => {
                let hinted = (at - now).to_std().unwrap_or(Duration::ZERO);
                debug!(hinted_ms = hinted.as_millis() as u64, "Provider supplied retry hint");
                computed.max(hinted)
            }
            _ => computed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn handler() -> RetryHandler {
        let policy = RetryPolicy::new(
            3,
            Duration::from_millis(10),
            Duration::from_secs(1),
            2.0,
        )
        .unwrap();
        RetryHandler::new(policy)
    }

    #[test]
    fn future_hint_stretches_delay() {
        let now = Utc::now();
        let err = ProviderError::quota("slow down", Some(now + TimeDelta::seconds(5)));
        assert_eq!(handler().delay_for(&err, 0, now), Duration::from_secs(5));
    }

    #[test]
    fn past_hint_is_ignored() {
        let now = Utc::now();
        let err = ProviderError::quota("slow down", Some(now - TimeDelta::seconds(5)));
        let delay = handler().delay_for(&err, 0, now);
        assert!(delay >= Duration::from_millis(10));
        assert!(delay <= Duration::from_millis(11));
    }

    #[test]
    fn short_hint_does_not_shorten_backoff() {
        let now = Utc::now();
        let err = ProviderError::quota("slow down", Some(now + TimeDelta::milliseconds(1)));
        let delay = handler().delay_for(&err, 2, now);
        assert!(delay >= Duration::from_millis(40));
    }
}
