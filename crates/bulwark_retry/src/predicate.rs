//! Override predicates that widen the default retry matrix.

use bulwark_error::ProviderError;
use std::collections::HashSet;

/// Decides whether an error the default matrix would refuse should be retried.
///
/// Predicates can only add retries. Returning `false` defers to the default
/// matrix; it never blocks a retry the matrix allows.
///
/// Closures taking `&ProviderError` implement this trait.
///
/// # Example
///
/// ```
/// use bulwark_error::{ProviderError, ProviderErrorKind};
/// use bulwark_retry::RetryPolicy;
///
/// // Some gateways report overload as a 400.
/// let policy = RetryPolicy::default()
///     .with_predicate(|err: &ProviderError| err.code() == Some("overloaded"));
///
/// let err = ProviderError::client("busy").with_code("overloaded");
/// assert!(policy.can_retry(&err, 0));
/// ```
pub trait RetryPredicate: Send + Sync {
    /// `true` to force a retry of `error`.
    fn should_retry(&self, error: &ProviderError) -> bool;
}

impl<F> RetryPredicate for F
where
    F: Fn(&ProviderError) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &ProviderError) -> bool {
        self(error)
    }
}

/// Retry any error whose code is in a fixed set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryOnCodes {
    codes: HashSet<String>,
}

impl RetryOnCodes {
    /// Retry errors carrying any of `codes`.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }
}

impl RetryPredicate for RetryOnCodes {
    fn should_retry(&self, error: &ProviderError) -> bool {
        error.code().is_some_and(|code| self.codes.contains(code))
    }
}
