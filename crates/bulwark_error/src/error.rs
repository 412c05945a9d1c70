//! Top-level error wrapper types.

use crate::{ConfigError, PolicyError, ProviderError, RateLimitError};

/// Every failure the Bulwark crates can surface.
///
/// # Examples
///
/// ```
/// use bulwark_error::{BulwarkError, ProviderError};
///
/// let err: BulwarkError = ProviderError::auth("invalid api key").into();
/// assert!(format!("{}", err).contains("Authentication failed"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum BulwarkErrorKind {
    /// Classified provider failure
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Rate limiter construction or admission failure
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
    /// Retry policy validation failure
    #[from(PolicyError)]
    Policy(PolicyError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Bulwark error with kind discrimination.
///
/// # Examples
///
/// ```
/// use bulwark_error::{BulwarkErrorKind, BulwarkResult, ConfigError, ConfigErrorKind};
///
/// fn might_fail() -> BulwarkResult<()> {
///     Err(ConfigError::new(ConfigErrorKind::Parse("missing [retry]".into())))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), BulwarkErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Bulwark Error: {}", _0)]
pub struct BulwarkError(Box<BulwarkErrorKind>);

impl BulwarkError {
    /// Create a new error from a kind.
    pub fn new(kind: BulwarkErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &BulwarkErrorKind {
        &self.0
    }

    /// The provider failure, if this error is one.
    pub fn as_provider(&self) -> Option<&ProviderError> {
        match self.kind() {
            BulwarkErrorKind::Provider(err) => Some(err),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to BulwarkErrorKind
impl<T> From<T> for BulwarkError
where
    T: Into<BulwarkErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Bulwark operations.
pub type BulwarkResult<T> = std::result::Result<T, BulwarkError>;
