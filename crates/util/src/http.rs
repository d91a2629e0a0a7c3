//! # HTTP Utilities
//!
//! Response parsing helpers shared by the inference client and the CLI.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Return a user-friendly error message for common HTTP status codes.
///
/// # Example
/// ```rust
/// use hudl_util::http::status_error_message;
///
/// assert!(status_error_message(403).unwrap().contains("HUDL_API_KEY"));
/// assert!(status_error_message(404).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 | 403 => Some(format!(
            "Unauthorized ({status_code}). Hint: check that HUDL_API_KEY holds a valid key for this endpoint"
        )),
        429 => Some("Too many requests (429). Hint: wait a moment and try again".into()),
        502..=504 => Some(format!("Endpoint unavailable ({status_code}). Hint: the model may still be loading")),
        _ => None,
    }
}

/// Decode a response body as JSON.
///
/// Failures carry the HTTP status (when known) and a one-line preview of the
/// body, so an HTML error page or a truncated body is recognisable in logs.
pub fn parse_response_json_strict(text: &str, status: Option<StatusCode>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|source| JsonParseError {
        status: status.map(|code| code.as_u16()),
        source,
        body_preview: body_preview(text, PREVIEW_CHARS),
    })
}

const PREVIEW_CHARS: usize = 200;

/// Collapse whitespace runs into single spaces and keep at most `limit` characters.
fn body_preview(text: &str, limit: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "<empty>".to_string();
    }
    if collapsed.chars().count() <= limit {
        return collapsed;
    }
    let head: String = collapsed.chars().take(limit).collect();
    format!("{head}...")
}

/// A response body that is not valid JSON.
#[derive(Debug, Error)]
#[error("response is not valid JSON ({}): {source}; body: {body_preview}", status_note(.status))]
pub struct JsonParseError {
    status: Option<u16>,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

fn status_note(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "status unknown".to_string(),
    }
}

impl JsonParseError {
    /// HTTP status of the response, when known.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}
