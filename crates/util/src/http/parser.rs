//! # HTTP Response Parsing
//!
//! Helpers for turning raw response bodies from the job-application service
//! into JSON values without panicking on malformed payloads.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Maximum number of characters kept when previewing a response body.
pub const RESPONSE_PREVIEW_LIMIT: usize = 200;

/// Return a user-friendly hint for common HTTP status codes.
///
/// # Example
/// ```rust
/// use jobapp_util::http::status_error_message;
///
/// let error_401 = status_error_message(401).unwrap();
/// assert!(error_401.contains("Unauthorized"));
/// assert!(error_401.contains("PASSWORD"));
///
/// assert!(status_error_message(404).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        400 => Some("Bad Request (400). Hint: the service rejected the payload; the account may already exist".into()),
        401 => Some("Unauthorized (401). Hint: check EMAIL and PASSWORD".into()),
        403 => Some("Forbidden (403). Hint: the session token was refused".into()),
        _ => None,
    }
}

/// Decode a response body as JSON.
///
/// Blank bodies fail like any other text that is not JSON. `status` only feeds
/// the error message; whether a failure ends the run is up to the caller (the
/// polling loop logs it and asks again).
///
/// ```rust
/// use jobapp_util::http::parse_response_json_strict;
///
/// let value = parse_response_json_strict(r#"{"status": "COMPLETED"}"#, None).unwrap();
/// assert_eq!(value["status"], "COMPLETED");
///
/// let error = parse_response_json_strict("<html>busy</html>", None).unwrap_err();
/// assert_eq!(error.body_preview(), "<html>busy</html>");
/// ```
pub fn parse_response_json_strict(text: &str, status: Option<StatusCode>) -> Result<Value, JsonParseError> {
    serde_json::from_str(text).map_err(|source| JsonParseError::from_body(text, status, source))
}

/// Collapse whitespace in a response body and cut it to `limit` characters.
///
/// Blank bodies render as `<empty>`.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    let mut kept = 0usize;
    for ch in text.chars() {
        if kept >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                    kept += 1;
                }
            }
            _ => {
                preview.push(ch);
                kept += 1;
            }
        }
    }

    preview.trim().to_string()
}

/// A response body that could not be decoded as JSON.
#[derive(Debug, Error)]
#[error("response body is not JSON ({}): {source}; body: {body_preview}", describe_status(.status))]
pub struct JsonParseError {
    status: Option<StatusCode>,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    fn from_body(body: &str, status: Option<StatusCode>, source: serde_json::Error) -> Self {
        Self {
            status,
            source,
            body_preview: truncate_response_preview(body, RESPONSE_PREVIEW_LIMIT),
        }
    }

    /// Status of the reply, if the caller passed one in.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }

    pub fn source_error(&self) -> &serde_json::Error {
        &self.source
    }
}

fn describe_status(status: &Option<StatusCode>) -> String {
    status.map_or_else(|| "status unknown".to_string(), |code| format!("status {code}"))
}
