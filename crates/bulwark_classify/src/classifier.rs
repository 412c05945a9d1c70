//! Failure classification rules.

use crate::{
    Failure, HttpResponse, TransportFailure, TransportFailureKind, extract_details,
    retry_after_from,
};
use bulwark_error::{ProviderError, ProviderErrorKind};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// Headers that carry a provider request id, in lookup order.
const CORRELATION_HEADERS: [&str; 3] = ["x-request-id", "request-id", "x-correlation-id"];

/// Code for failures nothing else recognised.
const UNKNOWN_CODE: &str = "unknown_error";

/// Classify any failure against the current wall clock.
///
/// Already-classified errors pass through unchanged.
pub fn classify(failure: impl Into<Failure>, provider: &str) -> ProviderError {
    classify_at(failure, provider, Utc::now())
}

/// Classify any failure, resolving relative retry hints against `now`.
#[instrument(skip(failure, now))]
pub fn classify_at(
    failure: impl Into<Failure>,
    provider: &str,
    now: DateTime<Utc>,
) -> ProviderError {
    let error = match failure.into() {
        Failure::Classified(error) => return error,
        Failure::Http(response) => classify_response_at(&response, provider, now),
        Failure::Transport(failure) => classify_transport(&failure, provider),
        Failure::Admission(err) => ProviderError::client(err.to_string())
            .with_code("admission_rejected")
            .with_provider(provider),
        Failure::Other(err) => ProviderError::client(err.to_string())
            .with_code(UNKNOWN_CODE)
            .with_provider(provider),
    };
    debug!(
        kind = error.kind().name(),
        code = error.code(),
        "Classified provider failure"
    );
    error
}

/// Classify an HTTP response by status code.
///
/// # Examples
///
/// ```
/// use bulwark_classify::{ResponseSnapshot, classify_response};
/// use bulwark_error::ProviderErrorKind;
///
/// let response = ResponseSnapshot::new(401)
///     .with_body(r#"{"error":{"message":"Incorrect API key","code":"invalid_api_key"}}"#);
/// let err = classify_response(&response, "openai");
///
/// assert_eq!(err.kind(), &ProviderErrorKind::Auth);
/// assert_eq!(err.message(), "Incorrect API key");
/// assert_eq!(err.code(), Some("invalid_api_key"));
/// ```
pub fn classify_response<R>(response: &R, provider: &str) -> ProviderError
where
    R: HttpResponse + ?Sized,
{
    classify_response_at(response, provider, Utc::now())
}

fn classify_response_at<R>(response: &R, provider: &str, now: DateTime<Utc>) -> ProviderError
where
    R: HttpResponse + ?Sized,
{
    let status = response.status();
    let kind = match status {
        429 => ProviderErrorKind::Quota {
            retry_after: retry_after_from(response, now),
        },
        401 | 403 => ProviderErrorKind::Auth,
        s if s >= 500 => ProviderErrorKind::Transient,
        _ => ProviderErrorKind::Client,
    };

    let details = extract_details(response.body_text());
    let message = details
        .message
        .unwrap_or_else(|| fallback_message(status, response.body_text()));
    let code = details.code.unwrap_or_else(|| format!("http_{}", status));

    let mut error = ProviderError::new(kind, message)
        .with_code(code)
        .with_provider(provider);
    if let Some(payload) = details.payload {
        error = error.with_payload(payload);
    }
    if let Some(id) = CORRELATION_HEADERS
        .iter()
        .find_map(|name| response.header(name))
    {
        error = error.with_correlation_id(id);
    }
    error
}

/// Classify a transport failure.
///
/// Timeouts and connection failures are transient; decode failures and
/// uncategorised transport errors are client errors.
pub fn classify_transport(failure: &TransportFailure, provider: &str) -> ProviderError {
    let (kind, code) = match failure.kind() {
        TransportFailureKind::Timeout => (ProviderErrorKind::Transient, "timeout"),
        TransportFailureKind::Connect => (ProviderErrorKind::Transient, "connection_failed"),
        TransportFailureKind::Decode => (ProviderErrorKind::Client, "decode_failed"),
        TransportFailureKind::Other => (ProviderErrorKind::Client, UNKNOWN_CODE),
    };
    ProviderError::new(kind, failure.to_string())
        .with_code(code)
        .with_provider(provider)
}

/// Raw body text, or the status line when the body is empty.
fn fallback_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status");
    format!("HTTP {} {}", status, reason)
}
