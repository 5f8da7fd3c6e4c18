//! HTTP plumbing shared by the bot service adapters.

use std::time::Duration;

use serde::de::DeserializeOwned;

use lexbot_types::error::RemoteError;

/// Build the reqwest client every adapter uses.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, RemoteError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RemoteError::Unavailable(format!("failed to create HTTP client: {e}")))
}

/// Connection failures and timeouts are always worth retrying.
pub fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Unavailable(format!("request timed out: {err}"))
    } else {
        RemoteError::Unavailable(format!("HTTP request failed: {err}"))
    }
}

/// Classify a non-success response from a REST adapter.
pub async fn error_from_response(response: reqwest::Response) -> RemoteError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: Option<serde_json::Value> = serde_json::from_str(&body).ok();

    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.pointer("/error/message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.clone());
    let code = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/status"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());

    tracing::warn!(status = %status, code = %code, message = %message, "bot service error response");
    status_error(status.as_u16(), code, message)
}

/// Map an HTTP error status to a [`RemoteError`].
///
/// - 404: [`RemoteError::NotFound`]
/// - 429 and 5xx: [`RemoteError::Unavailable`]
/// - any other status: [`RemoteError::Rejected`]
pub fn status_error(status: u16, code: String, message: String) -> RemoteError {
    match status {
        404 => RemoteError::NotFound(message),
        429 => RemoteError::Unavailable(format!("throttled (HTTP 429): {message}")),
        s if s >= 500 => RemoteError::Unavailable(format!("server error (HTTP {s}): {message}")),
        s => RemoteError::Rejected {
            status: s,
            code,
            message,
        },
    }
}

/// Deserialize a success response body.
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
    let body = response.bytes().await.map_err(transport_error)?;
    // Some calls answer with an empty body.
    let body: &[u8] = if body.is_empty() { b"{}" } else { &body };
    serde_json::from_slice(body)
        .map_err(|e| RemoteError::Deserialization(format!("failed to parse response: {e}")))
}
