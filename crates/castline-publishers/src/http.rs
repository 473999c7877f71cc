//! Shared HTTP plumbing for adapters

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::publisher::PublishError;

pub(crate) fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))
}

/// Send and classify: 2xx body as JSON (`Null` when empty), 4xx `Rejected`,
/// 5xx and transport failures `Unavailable`.
pub(crate) async fn send_json(request: RequestBuilder) -> Result<Value, PublishError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            PublishError::Unavailable("request timed out".to_string())
        } else {
            PublishError::Unavailable(format!("request failed: {}", e))
        }
    })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PublishError::Unavailable(format!("failed to read response: {}", e)))?;

    if status.is_client_error() {
        return Err(PublishError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    if !status.is_success() {
        return Err(PublishError::Unavailable(format!(
            "{} - {}",
            status,
            error_message(&body)
        )));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|e| PublishError::Unavailable(format!("unparseable response: {}", e)))
}

/// Pull a human-readable message out of common error envelopes
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.pointer("/errors/0/detail"))
            .or_else(|| v.get("error_description"))
            .or_else(|| v.get("message"))
            .or_else(|| v.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    match message {
        Some(m) => m,
        None if body.trim().is_empty() => "no response body".to_string(),
        None => body.chars().take(500).collect(),
    }
}

/// String-or-number id at `pointer`
pub(crate) fn id_at(body: &Value, pointer: &str) -> Option<String> {
    match body.pointer(pointer)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
