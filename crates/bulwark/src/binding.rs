//! Per-provider wiring of rate limiter and retry handler.

use crate::BulwarkConfig;
use bulwark_classify::Failure;
use bulwark_error::{BulwarkResult, ProviderError};
use bulwark_rate_limit::{LimiterSettings, RateLimiter};
use bulwark_retry::{RetryHandler, RetryPolicy};
use tracing::{debug, instrument};

/// Everything one provider client needs to call out safely.
///
/// Owns the provider's limiter (if it has one) and a retry handler tagged
/// with the provider id. Each attempt of [`call`](Self::call) waits for
/// admission before it runs, so retries spend rate budget like any other
/// request.
#[derive(Debug, Clone)]
pub struct ProviderBinding {
    provider: String,
    limiter: Option<RateLimiter>,
    handler: RetryHandler,
}

impl ProviderBinding {
    /// Bind `provider` to an optional limiter and a retry policy.
    pub fn new(provider: impl Into<String>, limiter: Option<RateLimiter>, policy: RetryPolicy) -> Self {
        let provider = provider.into();
        let handler = RetryHandler::new(policy).with_provider(provider.clone());
        Self {
            provider,
            limiter,
            handler,
        }
    }

    /// Build a binding from loaded configuration and the provider's limiter settings.
    ///
    /// # Errors
    ///
    /// Fails if the limiter settings or the `[retry]` values are invalid.
    #[instrument(skip(config, settings))]
    pub fn from_config(
        provider: &str,
        config: &BulwarkConfig,
        settings: LimiterSettings,
    ) -> BulwarkResult<Self> {
        let limiter = settings.resolve(provider, &config.limits())?;
        let policy = config.retry_policy()?;
        debug!(
            limited = limiter.is_some(),
            max_attempts = policy.max_attempts(),
            "Created provider binding"
        );
        Ok(Self::new(provider, limiter, policy))
    }

    /// Provider id.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The limiter gating this provider, if any.
    pub fn limiter(&self) -> Option<&RateLimiter> {
        self.limiter.as_ref()
    }

    /// The retry handler.
    pub fn handler(&self) -> &RetryHandler {
        &self.handler
    }

    /// Run `operation` with admission control and retries.
    ///
    /// The future returned by `operation` is not polled until the limiter
    /// admits the attempt.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the last attempt. A limiter reset
    /// during admission surfaces as a non-retryable client error.
    pub async fn call<T, E, F, Fut>(&self, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Failure>,
    {
        self.handler
            .execute(|| admitted(self.limiter.clone(), operation()))
            .await
    }

    /// Release the binding, resetting its limiter.
    ///
    /// Callers still queued on the limiter fail with a reset error. A
    /// prebuilt limiter shared with other bindings is reset for all of them.
    #[instrument(skip(self), fields(provider = %self.provider))]
    pub fn dispose(self) {
        if let Some(limiter) = &self.limiter {
            limiter.reset();
        }
        debug!("Provider binding disposed");
    }
}

/// Wait for admission, then run one attempt.
async fn admitted<T, E, Fut>(limiter: Option<RateLimiter>, attempt: Fut) -> Result<T, Failure>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<Failure>,
{
    if let Some(limiter) = limiter {
        limiter.acquire().await?;
    }
    attempt.await.map_err(Into::into)
}
