//! Provider failure taxonomy.
//!
//! Every failure observed while calling a remote AI provider is reduced to one
//! of five kinds. The kind alone decides default retry eligibility; the rest of
//! the error carries diagnostics for the caller.

use chrono::{DateTime, Utc};
use std::fmt;

/// The closed set of provider failure kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProviderErrorKind {
    /// Credential or permission failure (HTTP 401/403).
    #[display("Authentication failed")]
    Auth,
    /// Malformed or invalid request, or an unrecognized failure.
    #[display("Invalid request")]
    Client,
    /// The provider does not support the requested operation.
    #[display("Capability not supported")]
    Capability,
    /// Network, timeout, or server-side failure.
    #[display("Transient failure")]
    Transient,
    /// Rate limit or quota exceeded.
    #[display("Quota exceeded")]
    Quota {
        /// Earliest instant the provider considers safe to retry.
        retry_after: Option<DateTime<Utc>>,
    },
}

impl ProviderErrorKind {
    /// Check if this kind is retryable under the default matrix.
    ///
    /// `Transient` and `Quota` are retryable; everything else is not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderErrorKind::Transient | ProviderErrorKind::Quota { .. }
        )
    }

    /// The retry hint carried by a `Quota` kind, if any.
    pub fn retry_after(&self) -> Option<DateTime<Utc>> {
        match self {
            ProviderErrorKind::Quota { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Short stable name, used as a structured logging field.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderErrorKind::Auth => "auth",
            ProviderErrorKind::Client => "client",
            ProviderErrorKind::Capability => "capability",
            ProviderErrorKind::Transient => "transient",
            ProviderErrorKind::Quota { .. } => "quota",
        }
    }
}

/// A classified provider failure with source location tracking.
///
/// Values are immutable once built: the `with_*` methods consume the error and
/// return a new one, and there are no setters.
///
/// # Examples
///
/// ```
/// use bulwark_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::transient("upstream connect error")
///     .with_provider("openai")
///     .with_code("502");
///
/// assert_eq!(err.kind(), &ProviderErrorKind::Transient);
/// assert_eq!(err.provider(), Some("openai"));
/// assert!(err.is_retryable());
/// ```
#[derive(Debug, Clone, PartialEq, derive_more::Error)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    code: Option<String>,
    provider: Option<String>,
    provider_payload: Option<serde_json::Value>,
    correlation_id: Option<String>,
    line: u32,
    file: &'static str,
}

impl ProviderError {
    /// Create a new provider error with automatic location tracking.
    ///
    /// An empty message is replaced by the kind's description so that every
    /// error carries something readable.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.to_string()
        } else {
            message
        };
        Self {
            kind,
            message,
            code: None,
            provider: None,
            provider_payload: None,
            correlation_id: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Credential or permission failure.
    #[track_caller]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Auth, message)
    }

    /// Malformed or invalid request.
    #[track_caller]
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Client, message)
    }

    /// Operation unsupported by the target provider.
    #[track_caller]
    pub fn capability(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Capability, message)
    }

    /// Network, timeout, or server failure.
    #[track_caller]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transient, message)
    }

    /// Rate limit or quota exceeded, optionally gated until `retry_after`.
    #[track_caller]
    pub fn quota(message: impl Into<String>, retry_after: Option<DateTime<Utc>>) -> Self {
        Self::new(ProviderErrorKind::Quota { retry_after }, message)
    }

    /// Attach a provider error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the provider id that produced the failure.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attach the raw provider payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.provider_payload = Some(payload);
        self
    }

    /// Attach a request correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ProviderErrorKind {
        &self.kind
    }

    /// Human-readable message. Never empty.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Provider-specific error code, if known.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Provider id, if known.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Raw provider payload, if captured.
    pub fn provider_payload(&self) -> Option<&serde_json::Value> {
        self.provider_payload.as_ref()
    }

    /// Correlation id, if the provider returned one.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Earliest safe retry instant for quota failures.
    pub fn retry_after(&self) -> Option<DateTime<Utc>> {
        self.kind.retry_after()
    }

    /// Line number where the error was created.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File where the error was created.
    pub fn file(&self) -> &'static str {
        self.file
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Provider Error")?;
        if let Some(provider) = &self.provider {
            write!(f, " [{}]", provider)?;
        }
        write!(f, ": {}: {}", self.kind, self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code {})", code)?;
        }
        write!(f, " at line {} in {}", self.line, self.file)
    }
}

/// Trait for errors that know whether they are worth retrying.
///
/// # Examples
///
/// ```
/// use bulwark_error::{ProviderError, RetryableError};
///
/// assert!(ProviderError::transient("503").is_retryable());
/// assert!(!ProviderError::auth("bad key").is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient failures and quota exhaustion return true. Authentication,
    /// invalid requests, and unsupported capabilities return false.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
