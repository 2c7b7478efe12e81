//! News API client for company headlines

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::AlertConfig;
use crate::error::{AlertError, Result};
use crate::models::Headline;
use crate::provider::NewsProvider;

const BASE_URL: &str = "https://newsapi.org/v2/everything";

/// Body of a `/v2/everything` reply, success or error
#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: Option<String>,
    message: Option<String>,
    articles: Option<Vec<NewsApiArticle>>,
}

/// News API article, only the fields an alert needs
#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
}

/// News API client
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    /// Create a new News API client
    ///
    /// # Arguments
    /// * `api_key` - newsapi.org API key
    /// * `timeout` - Upper bound for each request
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_config(config: &AlertConfig) -> Result<Self> {
        Self::new(config.credentials.news_api_key.clone(), config.request_timeout)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the `/v2/everything` request for `query`
    pub fn request(&self, query: &str) -> Result<Request> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("apiKey", self.api_key.as_str()),
            ])
            .build()
            .map_err(super::redact)?;
        Ok(request)
    }

    /// Search English articles matching `query`, newest first
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Headline>> {
        let request = self.request(query)?;
        let response = self.client.execute(request).await.map_err(|e| {
            AlertError::NewsError(format!("News API request failed: {}", super::redact(e)))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(super::redact)?;

        if !status.is_success() {
            return Err(AlertError::NewsError(format!(
                "News API error {status}: {}",
                super::error_reason(&body)
            )));
        }

        let headlines = parse_headlines(&body, limit)?;
        debug!(count = headlines.len(), "headlines found");
        Ok(headlines)
    }
}

/// Parse a `/v2/everything` body into at most `limit` headlines.
///
/// Articles without a title or URL are skipped before the cut.
pub fn parse_headlines(body: &str, limit: usize) -> Result<Vec<Headline>> {
    let response: EverythingResponse = serde_json::from_str(body)
        .map_err(|e| AlertError::NewsError(format!("Failed to parse News API response: {e}")))?;

    if response.status.as_deref() == Some("error") {
        return Err(AlertError::NewsError(
            response
                .message
                .unwrap_or_else(|| "News API returned an error".to_string()),
        ));
    }

    let articles = response
        .articles
        .ok_or_else(|| AlertError::NewsError("response has no articles field".to_string()))?;

    Ok(articles
        .into_iter()
        .filter_map(|article| match (article.title, article.url) {
            (Some(title), Some(url)) if !title.trim().is_empty() && !url.trim().is_empty() => {
                Some(Headline { title, url })
            }
            _ => None,
        })
        .take(limit)
        .collect())
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    async fn latest_headlines(&self, company: &str, limit: usize) -> Result<Vec<Headline>> {
        self.search(company, limit).await
    }
}
