//! HTTP error mapping utilities

use crate::error::RequestError;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Response;
use serde_json::Value;

/// MIME type of JSON bodies
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// MIME type of a server-sent event stream
pub const CONTENT_TYPE_EVENT_STREAM: &str = "text/event-stream";

/// The response MIME type, lowercased and without parameters.
///
/// `application/json; charset=utf-8` becomes `application/json`; a missing
/// header becomes `application/octet-stream`, as HTTP prescribes.
pub fn normalized_content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Reason phrase of a status, or an empty string for unknown codes
pub fn reason_phrase(status: reqwest::StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

/// Pull `error.code` out of a decoded error body.
///
/// Bodies of a different shape simply yield `None`. Numeric codes are
/// rendered as their JSON text.
pub fn extract_error_code(body: &Value) -> Option<String> {
    match body.get("error")?.get("code")? {
        Value::Null => None,
        Value::String(code) => Some(code.clone()),
        other => Some(other.to_string()),
    }
}

/// Build a request error from the parts of a failed response.
///
/// When the body is JSON its `error.code` is appended to the reason after a
/// comma and the decoded body is kept for logging.
pub fn map_http_error(
    message: impl Into<String>,
    status: reqwest::StatusCode,
    reason: &str,
    body: Option<Value>,
) -> RequestError {
    let reason = match body.as_ref().and_then(extract_error_code) {
        Some(code) => format!("{}, {}", reason, code),
        None => reason.to_string(),
    };
    RequestError::new(message, status.as_u16(), reason, body)
}

/// Consume a non-success response of a completion endpoint.
///
/// Only a body declared as JSON is read; a JSON body that fails to decode is
/// a transport concern and propagates as such.
pub async fn request_error_from_response(
    message: impl Into<String>,
    response: Response,
) -> Result<RequestError, reqwest::Error> {
    let status = response.status();
    let body = if normalized_content_type(response.headers()) == CONTENT_TYPE_JSON {
        Some(response.json::<Value>().await?)
    } else {
        None
    };
    Ok(map_http_error(message, status, reason_phrase(status), body))
}
