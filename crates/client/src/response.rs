//! Response decoding shared by the typed operations

use crate::error::ClientError;
use crate::types::ErrorBody;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Maximum number of characters of a non-JSON error body surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

/// Read the body and fail on a non-2xx status or a `status: false` body.
///
/// `fallback` is the message used when the server gives no reason.
pub async fn expect_success(response: Response, fallback: &str) -> Result<Value, ClientError> {
    let status = response.status();
    let text = response.text().await?;
    check_body(status, &text, fallback)
}

/// Like [`expect_success`], then deserialize the body into `T`.
pub async fn decode<T: DeserializeOwned>(
    response: Response,
    fallback: &str,
) -> Result<T, ClientError> {
    let body = expect_success(response, fallback).await?;
    Ok(serde_json::from_value(body)?)
}

fn check_body(status: StatusCode, text: &str, fallback: &str) -> Result<Value, ClientError> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(text)
            .ok()
            .and_then(|body| body.reason().map(str::to_string))
            .unwrap_or_else(|| sanitize_body(text, fallback));
        return Err(ClientError::from_status(status, message));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    let body: Value = serde_json::from_str(text)?;
    if body.get("status").and_then(Value::as_bool) == Some(false) {
        let message = serde_json::from_value::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.reason().map(str::to_string))
            .unwrap_or_else(|| fallback.to_string());
        return Err(ClientError::Rejected(message));
    }

    Ok(body)
}

/// Trim and truncate a raw error body, falling back when it is empty.
fn sanitize_body(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') {
        fallback.to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
