//! Message and code extraction from provider error bodies.

use serde_json::Value;

/// What could be pulled out of an error response body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorDetails {
    /// Structured message, if the body had one.
    pub message: Option<String>,
    /// Structured error code, if the body had one.
    pub code: Option<String>,
    /// The body itself: parsed JSON, or the raw text as a JSON string.
    pub payload: Option<Value>,
}

/// Extract message, code, and payload from a response body.
///
/// Looks at `error.message` / `error.code` first (with `error.type` as a
/// code fallback, and a bare string `error` as a message), then top-level
/// `message` / `code`. Bodies that are not JSON yield only a payload. Never
/// fails.
///
/// # Examples
///
/// ```
/// use bulwark_classify::extract_details;
///
/// let details = extract_details(r#"{"error":{"message":"bad key","code":"invalid_api_key"}}"#);
/// assert_eq!(details.message.as_deref(), Some("bad key"));
/// assert_eq!(details.code.as_deref(), Some("invalid_api_key"));
///
/// let plain = extract_details("<html>502 Bad Gateway</html>");
/// assert_eq!(plain.message, None);
/// ```
pub fn extract_details(body: &str) -> ErrorDetails {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return ErrorDetails::default();
    }

    let Ok(json) = serde_json::from_str::<Value>(trimmed) else {
        return ErrorDetails {
            message: None,
            code: None,
            payload: Some(Value::String(body.to_string())),
        };
    };

    let nested = json.get("error");
    let message = nested
        .and_then(|error| error.get("message"))
        .and_then(as_text)
        .or_else(|| nested.and_then(as_text))
        .or_else(|| json.get("message").and_then(as_text));
    let code = nested
        .and_then(|error| error.get("code").and_then(as_text))
        .or_else(|| nested.and_then(|error| error.get("type")).and_then(as_text))
        .or_else(|| json.get("code").and_then(as_text));

    ErrorDetails {
        message,
        code,
        payload: Some(json),
    }
}

/// Render scalar JSON values as text; anything else is not a usable field.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_fields_win_over_top_level() {
        let details = extract_details(
            r#"{"message":"outer","code":"outer_code","error":{"message":"inner","code":"inner_code"}}"#,
        );
        assert_eq!(details.message.as_deref(), Some("inner"));
        assert_eq!(details.code.as_deref(), Some("inner_code"));
    }

    #[test]
    fn top_level_fields_are_a_fallback() {
        let details = extract_details(r#"{"message":"Too many requests","code":429}"#);
        assert_eq!(details.message.as_deref(), Some("Too many requests"));
        assert_eq!(details.code.as_deref(), Some("429"));
    }

    #[test]
    fn error_type_used_when_code_missing() {
        let details = extract_details(
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        );
        assert_eq!(details.message.as_deref(), Some("Overloaded"));
        assert_eq!(details.code.as_deref(), Some("overloaded_error"));
    }

    #[test]
    fn string_error_field_is_a_message() {
        let details = extract_details(r#"{"error":"model not found"}"#);
        assert_eq!(details.message.as_deref(), Some("model not found"));
    }

    #[test]
    fn malformed_json_keeps_raw_payload() {
        let details = extract_details("{not json");
        assert_eq!(details.message, None);
        assert_eq!(details.code, None);
        assert_eq!(details.payload, Some(Value::String("{not json".into())));
    }

    #[test]
    fn empty_body_has_nothing() {
        assert_eq!(extract_details("  "), ErrorDetails::default());
    }
}
