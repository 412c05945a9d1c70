//! Raw failure inputs accepted by the classifier.

use crate::{HttpResponse, ResponseSnapshot};
use bulwark_error::{ProviderError, RateLimitError};
use std::fmt;

/// Transport-level failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportFailureKind {
    /// Connect or read timed out.
    #[display("timeout")]
    Timeout,
    /// Connection refused, reset, or DNS failure.
    #[display("connection failure")]
    Connect,
    /// Response body could not be decoded.
    #[display("decode failure")]
    Decode,
    /// Anything the transport could not categorise.
    #[display("transport failure")]
    Other,
}

/// A failure raised by the HTTP transport before a usable response existed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    kind: TransportFailureKind,
    message: String,
}

impl TransportFailure {
    /// Create a transport failure of the given kind.
    pub fn new(kind: TransportFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Timed out waiting on the provider.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportFailureKind::Timeout, message)
    }

    /// Could not reach the provider.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(TransportFailureKind::Connect, message)
    }

    /// Reached the provider but could not decode its answer.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportFailureKind::Decode, message)
    }

    /// The failure category.
    pub fn kind(&self) -> TransportFailureKind {
        self.kind
    }

    /// Transport-supplied description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportFailure {}

impl From<&reqwest::Error> for TransportFailure {
    fn from(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportFailureKind::Timeout
        } else if err.is_connect() || err.is_request() || err.is_body() {
            TransportFailureKind::Connect
        } else if err.is_decode() {
            TransportFailureKind::Decode
        } else {
            TransportFailureKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

impl From<&std::io::Error> for TransportFailure {
    fn from(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        let kind = match err.kind() {
            ErrorKind::TimedOut => TransportFailureKind::Timeout,
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
            | ErrorKind::AddrNotAvailable => TransportFailureKind::Connect,
            ErrorKind::InvalidData => TransportFailureKind::Decode,
            _ => TransportFailureKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<&serde_json::Error> for TransportFailure {
    fn from(err: &serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

/// Anything a provider call can fail with, before classification.
///
/// Operations run under a retry handler return `Result<T, E>` where
/// `E: Into<Failure>`, so already-classified errors, transport errors, HTTP
/// responses, and arbitrary errors can all flow through the same path.
#[derive(Debug)]
pub enum Failure {
    /// Already classified; passes through unchanged.
    Classified(ProviderError),
    /// A non-success HTTP response.
    Http(ResponseSnapshot),
    /// A transport failure with no usable response.
    Transport(TransportFailure),
    /// The rate limiter refused admission.
    Admission(RateLimitError),
    /// An opaque error of unknown shape.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Failure {
    /// Wrap an arbitrary error as an opaque failure.
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Failure::Other(err.into())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Classified(err) => write!(f, "{}", err),
            Failure::Http(response) => write!(f, "HTTP {}", response.status()),
            Failure::Transport(err) => write!(f, "{}", err),
            Failure::Admission(err) => write!(f, "{}", err),
            Failure::Other(err) => write!(f, "{}", err),
        }
    }
}

impl From<ProviderError> for Failure {
    fn from(err: ProviderError) -> Self {
        Failure::Classified(err)
    }
}

impl From<ResponseSnapshot> for Failure {
    fn from(response: ResponseSnapshot) -> Self {
        Failure::Http(response)
    }
}

impl From<TransportFailure> for Failure {
    fn from(err: TransportFailure) -> Self {
        Failure::Transport(err)
    }
}

impl From<RateLimitError> for Failure {
    fn from(err: RateLimitError) -> Self {
        Failure::Admission(err)
    }
}

impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        // error_for_status() errors carry the status but not the body
        match err.status() {
            Some(status) => Failure::Http(ResponseSnapshot::new(status.as_u16())),
            None => Failure::Transport(TransportFailure::from(&err)),
        }
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        Failure::Transport(TransportFailure::from(&err))
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::Transport(TransportFailure::from(&err))
    }
}
