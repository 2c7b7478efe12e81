//! API clients for the external services

pub mod alpha_vantage;
pub mod bitly;
pub mod dry_run;
pub mod news_api;
pub mod twilio;

pub use alpha_vantage::AlphaVantageClient;
pub use bitly::BitlyClient;
pub use dry_run::LogNotifier;
pub use news_api::NewsApiClient;
pub use twilio::TwilioClient;

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Longest provider error text kept in an error message
const MAX_REASON_CHARS: usize = 200;

/// Build the HTTP client shared by one API wrapper.
///
/// Every request made through it is bounded by `timeout`.
pub fn http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Pull a human readable error out of a provider's JSON error body.
///
/// News API, Bitly and Twilio all put it under `message`.
pub(crate) fn provider_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

/// Drop the request URL from a transport error.
///
/// Alpha Vantage and News API take their keys in the query string, and
/// `reqwest::Error` prints the full URL.
pub(crate) fn redact(error: reqwest::Error) -> reqwest::Error {
    error.without_url()
}

/// Error text for a non-2xx reply: the provider's `message` when there is
/// one, otherwise the start of the raw body.
pub(crate) fn error_reason(body: &str) -> String {
    let reason = provider_message(body).unwrap_or_else(|| body.trim().to_string());
    match reason.char_indices().nth(MAX_REASON_CHARS) {
        Some((end, _)) => format!("{}...", &reason[..end]),
        None => reason,
    }
}
