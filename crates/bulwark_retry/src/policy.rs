//! Backoff schedule and retry eligibility.

use crate::RetryPredicate;
use bulwark_error::{PolicyError, PolicyErrorKind, ProviderError, RetryableError};
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Jitter is drawn uniformly from `[0, JITTER_FRACTION * base]`.
const JITTER_FRACTION: f64 = 0.1;

/// Exponential backoff policy with jitter and an optional retry override.
///
/// Stateless once built, so one policy can serve any number of concurrent
/// handlers.
///
/// # Examples
///
/// ```
/// use bulwark_retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::builder()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(10))
///     .multiplier(2.0)
///     .build()
///     .unwrap();
///
/// let delay = policy.next_delay(2);
/// assert!(delay >= Duration::from_millis(400));
/// assert!(delay <= Duration::from_millis(440));
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    predicate: Option<Arc<dyn RetryPredicate>>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("multiplier", &self.multiplier)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            predicate: None,
        }
    }
}

impl RetryPolicy {
    /// Create a validated policy.
    ///
    /// # Errors
    ///
    /// Fails if `max_attempts` is zero, `multiplier` is not a finite positive
    /// number, or `max_delay` is shorter than `initial_delay`.
    #[track_caller]
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::new(PolicyErrorKind::MaxAttempts(max_attempts)));
        }
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(PolicyError::new(PolicyErrorKind::Multiplier(multiplier)));
        }
        if max_delay < initial_delay {
            return Err(PolicyError::new(PolicyErrorKind::DelayOrder {
                initial_delay,
                max_delay,
            }));
        }
        Ok(Self {
            max_attempts,
            initial_delay,
            max_delay,
            multiplier,
            predicate: None,
        })
    }

    /// Creates a new policy builder.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Install an override predicate, replacing any previous one.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: RetryPredicate + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Total attempts allowed, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the first retry, before jitter.
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Upper bound on any single delay.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Growth factor between consecutive delays.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Delay before retry number `attempt + 1`.
    ///
    /// `attempt` is zero-based: `0` is the wait before the first retry. The
    /// result is `initial_delay * multiplier^attempt` plus up to 10% jitter,
    /// never more than `max_delay`.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let cap = self.max_delay.as_nanos() as f64;
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_nanos() as f64 * self.multiplier.powi(exponent);

        if !base.is_finite() || base >= cap {
            return self.max_delay;
        }

        let jitter = if base > 0.0 {
            rand::thread_rng().gen_range(0.0..=base * JITTER_FRACTION)
        } else {
            0.0
        };
        Duration::from_nanos((base + jitter).min(cap).round() as u64)
    }

    /// Whether a failure of attempt `attempt` (zero-based) may be retried.
    ///
    /// Refuses once the attempt budget is spent. Otherwise an installed
    /// predicate may force a retry, and the default matrix decides the rest:
    /// transient and quota errors retry, everything else does not.
    pub fn can_retry(&self, error: &ProviderError, attempt: u32) -> bool {
        if attempt.saturating_add(1) >= self.max_attempts {
            return false;
        }
        if self
            .predicate
            .as_ref()
            .is_some_and(|predicate| predicate.should_retry(error))
        {
            return true;
        }
        error.is_retryable()
    }
}

/// Builder for [`RetryPolicy`].
///
/// Unset fields take the [`RetryPolicy::default`] values.
#[derive(Default)]
pub struct RetryPolicyBuilder {
    max_attempts: Option<u32>,
    initial_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
    predicate: Option<Arc<dyn RetryPredicate>>,
}

impl fmt::Debug for RetryPolicyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicyBuilder")
            .field("max_attempts", &self.max_attempts)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("multiplier", &self.multiplier)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

impl RetryPolicyBuilder {
    /// Sets the total attempt budget.
    pub fn max_attempts(mut self, value: u32) -> Self {
        self.max_attempts = Some(value);
        self
    }

    /// Sets the delay before the first retry.
    pub fn initial_delay(mut self, value: Duration) -> Self {
        self.initial_delay = Some(value);
        self
    }

    /// Sets the delay cap.
    pub fn max_delay(mut self, value: Duration) -> Self {
        self.max_delay = Some(value);
        self
    }

    /// Sets the backoff multiplier.
    pub fn multiplier(mut self, value: f64) -> Self {
        self.multiplier = Some(value);
        self
    }

    /// Sets the override predicate.
    pub fn predicate<P>(mut self, predicate: P) -> Self
    where
        P: RetryPredicate + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Validate and build the policy.
    ///
    /// # Errors
    ///
    /// See [`RetryPolicy::new`].
    #[track_caller]
    pub fn build(self) -> Result<RetryPolicy, PolicyError> {
        let defaults = RetryPolicy::default();
        let mut policy = RetryPolicy::new(
            self.max_attempts.unwrap_or(defaults.max_attempts),
            self.initial_delay.unwrap_or(defaults.initial_delay),
            self.max_delay.unwrap_or(defaults.max_delay),
            self.multiplier.unwrap_or(defaults.multiplier),
        )?;
        policy.predicate = self.predicate;
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(initial_ms: u64, max_ms: u64, multiplier: f64) -> RetryPolicy {
        RetryPolicy::new(
            10,
            Duration::from_millis(initial_ms),
            Duration::from_millis(max_ms),
            multiplier,
        )
        .unwrap()
    }

    #[test]
    fn huge_attempt_index_is_capped() {
        let p = policy(100, 5_000, 2.0);
        assert_eq!(p.next_delay(u32::MAX), Duration::from_millis(5_000));
    }

    #[test]
    fn zero_initial_delay_has_no_jitter() {
        let p = policy(0, 1_000, 2.0);
        assert_eq!(p.next_delay(3), Duration::ZERO);
    }

    #[test]
    fn shrinking_multiplier_is_allowed() {
        let p = policy(1_000, 1_000, 0.5);
        let d = p.next_delay(1);
        assert!(d >= Duration::from_millis(500));
        assert!(d <= Duration::from_millis(550));
    }

    #[test]
    fn builder_uses_defaults_for_unset_fields() {
        let p = RetryPolicy::builder().max_attempts(7).build().unwrap();
        assert_eq!(p.max_attempts(), 7);
        assert_eq!(p.initial_delay(), Duration::from_millis(500));
        assert_eq!(p.max_delay(), Duration::from_secs(30));
        assert_eq!(p.multiplier(), 2.0);
    }
}
