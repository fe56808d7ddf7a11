//! Error mapping for remote service responses
//!
//! Converts a failed HTTP response (status plus body) into a categorized
//! ServiceError. Bodies may be plain text or JSON with a `message`/`error`
//! field.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, ServiceError};

/// Longest body excerpt folded into an error message
const MAX_BODY_EXCERPT: usize = 200;

/// Map a generic HTTP error to a ServiceError
pub fn map_http_error(status: StatusCode, body: &str, context: &mut ErrorContext) -> ServiceError {
    context.status_code = Some(status.as_u16());

    let body = body.trim();
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .or_else(|| json.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| excerpt(body));

    let message = if detail.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, detail)
    };

    match status {
        StatusCode::UNAUTHORIZED => ServiceError::authentication(message),
        StatusCode::FORBIDDEN => ServiceError::authorization(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::validation(message)
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ServiceError::timeout(message),
        _ => ServiceError::service(message),
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() > MAX_BODY_EXCERPT {
        let cut: String = body.chars().take(MAX_BODY_EXCERPT).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

/// Helper function to classify HTTP errors by category
pub fn classify_http_error(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 | 422 => "validation",
        401 => "authentication",
        403 => "authorization",
        404 => "not_found",
        408 | 504 => "timeout",
        500..=599 => "server",
        _ => "unknown",
    }
}
