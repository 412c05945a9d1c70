//! `Retry-After` hint parsing.
//!
//! The header holds either a non-negative number of seconds or an HTTP-date.
//! Values that parse to a point at or before `now`, or do not parse at all,
//! are treated as absent.

use crate::HttpResponse;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use tracing::trace;

/// Standard retry hint header.
const RETRY_AFTER: &str = "retry-after";

/// Millisecond hint some providers send alongside or instead of `Retry-After`.
const RETRY_AFTER_MS: &str = "retry-after-ms";

/// Parse a `Retry-After` header value into an absolute instant.
///
/// # Examples
///
/// ```
/// use bulwark_classify::parse_retry_after;
/// use chrono::{TimeDelta, Utc};
///
/// let now = Utc::now();
/// assert_eq!(parse_retry_after("30", now), Some(now + TimeDelta::seconds(30)));
/// assert_eq!(parse_retry_after("-1", now), None);
/// assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", now), None);
/// ```
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        let seconds = i64::try_from(value.parse::<u64>().ok()?).ok()?;
        return now.checked_add_signed(TimeDelta::try_seconds(seconds)?);
    }

    let date = parse_http_date(value)?;
    if date > now {
        Some(date)
    } else {
        trace!(%date, %now, "Ignoring Retry-After date that is not in the future");
        None
    }
}

/// Read the retry hint from a response.
///
/// `Retry-After` wins; `retry-after-ms` is used only when `Retry-After` is
/// missing or unusable.
pub fn retry_after_from<R>(response: &R, now: DateTime<Utc>) -> Option<DateTime<Utc>>
where
    R: HttpResponse + ?Sized,
{
    if let Some(at) = response
        .header(RETRY_AFTER)
        .and_then(|value| parse_retry_after(value, now))
    {
        return Some(at);
    }

    let millis = response.header(RETRY_AFTER_MS)?.trim().parse::<u64>().ok()?;
    let millis = i64::try_from(millis).ok()?;
    now.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

/// Parse the three date formats HTTP/1.1 allows.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    // IMF-fixdate: Sun, 06 Nov 1994 08:49:37 GMT
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    // RFC 850: Sunday, 06-Nov-94 08:49:37 GMT
    if let Ok(date) = NaiveDateTime::parse_from_str(value, "%A, %d-%b-%y %H:%M:%S GMT") {
        return Some(date.and_utc());
    }
    // asctime: Sun Nov  6 08:49:37 1994
    NaiveDateTime::parse_from_str(value, "%a %b %e %H:%M:%S %Y")
        .ok()
        .map(|date| date.and_utc())
}
