//! Inbound stage: turning transport outcomes into [`ApiError`]s.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::ApiError;

/// Body fields searched, in order, for a human-readable message.
const MESSAGE_FIELDS: [&str; 3] = ["message", "title", "detail"];

/// Longest raw body echoed back as a message.
const MAX_RAW_MESSAGE: usize = 200;

/// Classify a transport error (no usable response).
pub fn classify_transport(err: &reqwest::Error) -> ApiError {
    if err.is_builder() {
        ApiError::MalformedRequest {
            reason: err.to_string(),
        }
    } else if err.is_decode() {
        ApiError::Decode {
            reason: err.to_string(),
        }
    } else if err.is_timeout() {
        ApiError::Unreachable {
            reason: "request timed out".to_string(),
        }
    } else if err.is_connect() {
        ApiError::Unreachable {
            reason: format!("connection failed: {}", err),
        }
    } else {
        ApiError::Unreachable {
            reason: err.to_string(),
        }
    }
}

/// Classify an answered request. Returns `None` for 2xx.
pub fn classify_status(status: StatusCode, body: &str) -> Option<ApiError> {
    if status.is_success() {
        return None;
    }

    let message = extract_message(status, body);
    Some(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
        StatusCode::NOT_FOUND => ApiError::NotFound { message },
        _ => ApiError::Server { status, message },
    })
}

/// Pull a message out of an error body.
///
/// Looks for `message`, `title` and `detail` string fields in a JSON object,
/// unwraps a bare JSON string, then falls back to the raw body text (HTML
/// pages excluded), then to the canonical reason phrase.
pub fn extract_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => {
            let field = MESSAGE_FIELDS
                .iter()
                .filter_map(|field| map.get(*field).and_then(Value::as_str))
                .map(str::trim)
                .find(|text| !text.is_empty());
            if let Some(text) = field {
                return text.to_string();
            }
        }
        Ok(Value::String(text)) if !text.trim().is_empty() => {
            return truncate(text.trim(), MAX_RAW_MESSAGE);
        }
        _ => {}
    }

    if !trimmed.is_empty() && !trimmed.starts_with('<') {
        return truncate(trimmed, MAX_RAW_MESSAGE);
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
