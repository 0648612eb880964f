//! Helpers for deciding whether and how long to wait before a retry

use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::error::Error as _;
use std::time::Duration;

/// Statuses whose `Retry-After` header is honored
const RETRY_AFTER_STATUSES: [u16; 3] = [413, 429, 503];

/// Returns true for failures worth retrying: the connection could not be
/// established, timed out, or broke while the request was in flight
pub fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || (error.is_request() && !error.is_builder())
}

/// Returns true if a `Retry-After` header on this status should replace the
/// regular backoff
pub fn honors_retry_after(status_code: u16) -> bool {
    RETRY_AFTER_STATUSES.contains(&status_code)
}

/// Delay requested by the server through a `Retry-After: <seconds>` header
///
/// HTTP-date values are ignored and fall back to the regular backoff.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Human-readable description of a transport failure, including its causes
pub fn describe_error(error: &reqwest::Error) -> String {
    let summary = if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_redirect() {
        "too many redirects"
    } else {
        "request failed"
    };

    let mut message = summary.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
