//! Shared HTTP client for upstream APIs.

use reqwest::Client;

use super::error::InfraError;

pub fn user_agent() -> &'static str {
    concat!("tumbleproxy/", env!("CARGO_PKG_VERSION"))
}

/// Build the HTTP client shared by the Tumblr and oEmbed adapters.
pub fn build_client() -> Result<Client, InfraError> {
    Client::builder()
        .user_agent(user_agent())
        .build()
        .map_err(InfraError::from)
}

/// Extract a short diagnostic from an error body, preferring a Tumblr-style
/// `meta.msg` and falling back to the HTTP reason phrase.
pub(crate) fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/meta/msg")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string())
}
