//! Bitly link shortener

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::AlertConfig;
use crate::error::{AlertError, Result};
use crate::provider::LinkShortener;

const BASE_URL: &str = "https://api-ssl.bitly.com/v4/shorten";

#[derive(Debug, Serialize)]
struct ShortenRequest<'a> {
    long_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ShortenResponse {
    link: Option<String>,
}

/// Bitly client
#[derive(Debug, Clone)]
pub struct BitlyClient {
    client: Client,
    token: String,
    base_url: String,
}

impl BitlyClient {
    /// Create a new Bitly client.
    ///
    /// `token` may be given bare or with a leading `Bearer ` in any case.
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let token = token.into();

        Ok(Self {
            client: super::http_client(timeout)?,
            token: strip_bearer(&token).to_string(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_config(config: &AlertConfig) -> Result<Self> {
        Self::new(config.credentials.bitly_token.clone(), config.request_timeout)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the `/v4/shorten` request for `long_url`
    pub fn request(&self, long_url: &str) -> Result<Request> {
        let request = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&ShortenRequest { long_url })
            .build()?;
        Ok(request)
    }
}

fn strip_bearer(token: &str) -> &str {
    const PREFIX: &str = "bearer ";

    let token = token.trim();
    match token.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => token[PREFIX.len()..].trim_start(),
        _ => token,
    }
}

/// Read the short link out of a `/v4/shorten` reply
pub fn parse_link(body: &str) -> Result<String> {
    let response: ShortenResponse = serde_json::from_str(body)
        .map_err(|e| AlertError::ShortenError(format!("Failed to parse Bitly response: {e}")))?;

    response
        .link
        .filter(|link| !link.is_empty())
        .ok_or_else(|| AlertError::ShortenError("response has no link field".to_string()))
}

#[async_trait]
impl LinkShortener for BitlyClient {
    #[instrument(skip(self))]
    async fn shorten(&self, long_url: &str) -> Result<String> {
        let request = self.request(long_url)?;
        let response = self.client.execute(request).await.map_err(|e| {
            AlertError::ShortenError(format!("Bitly request failed: {}", super::redact(e)))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(super::redact)?;

        // 200 when the link already exists, 201 when created
        if !status.is_success() {
            return Err(AlertError::ShortenError(format!(
                "Bitly API error {status}: {}",
                super::error_reason(&body)
            )));
        }

        let link = parse_link(&body)?;
        debug!(%link, "shortened");
        Ok(link)
    }
}
