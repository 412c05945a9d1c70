//! The view of an HTTP response the classifier needs.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, trace};

/// Minimal response surface consumed by the classifier.
///
/// Header lookup must be case-insensitive.
pub trait HttpResponse {
    /// Numeric status code.
    fn status(&self) -> u16;

    /// Header value by name, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Response body as text.
    fn body_text(&self) -> &str;
}

/// An owned, fully-buffered HTTP response.
///
/// # Examples
///
/// ```
/// use bulwark_classify::{HttpResponse, ResponseSnapshot};
///
/// let response = ResponseSnapshot::new(429)
///     .with_header("Retry-After", "30")
///     .with_body(r#"{"error":{"message":"slow down"}}"#);
///
/// assert_eq!(response.status(), 429);
/// assert_eq!(response.header("retry-after"), Some("30"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResponseSnapshot {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl ResponseSnapshot {
    /// Create a snapshot with the given status, no headers, and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    /// Add a header. Names or values that are not valid HTTP are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => trace!(name, "Skipping invalid header"),
        }
        self
    }

    /// Replace all headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the body text.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// All headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Buffer a `reqwest` response.
    ///
    /// A body that cannot be read is recorded as empty; the status and headers
    /// alone are still enough to classify.
    pub async fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(status, error = %e, "Failed to read response body");
                String::new()
            }
        };
        Self {
            status,
            headers,
            body,
        }
    }
}

impl HttpResponse for ResponseSnapshot {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    fn body_text(&self) -> &str {
        &self.body
    }
}
