//! Alpha Vantage API client

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Request};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::AlertConfig;
use crate::error::{AlertError, Result};
use crate::models::QuoteResult;
use crate::provider::QuoteProvider;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const DAILY_SERIES_KEY: &str = "Time Series (Daily)";
const CLOSE_KEY: &str = "4. close";

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `timeout` - Upper bound for each request
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn from_config(config: &AlertConfig) -> Result<Self> {
        Self::new(
            config.credentials.alpha_vantage_api_key.clone(),
            config.request_timeout,
        )
    }

    /// Point the client at another endpoint (proxy, sandbox)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the `TIME_SERIES_DAILY` request for `symbol`
    pub fn request(&self, symbol: &str) -> Result<Request> {
        let request = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .build()
            .map_err(super::redact)?;
        Ok(request)
    }

    /// Get the most recent and previous daily closes
    #[instrument(skip(self))]
    pub async fn fetch_daily_closes(&self, symbol: &str) -> Result<(f64, f64)> {
        let request = self.request(symbol)?;
        let response = self.client.execute(request).await.map_err(super::redact)?;

        if !response.status().is_success() {
            return Err(AlertError::quote(
                symbol,
                format!("HTTP error: {}", response.status()),
            ));
        }

        let data: Value = response.json().await.map_err(super::redact)?;
        let closes = parse_daily_closes(symbol, &data)?;
        debug!(recent = closes.0, previous = closes.1, "daily closes");
        Ok(closes)
    }
}

/// Extract `(most_recent_close, previous_close)` from a `TIME_SERIES_DAILY`
/// payload.
///
/// Entries are ordered by their date keys rather than by map order.
pub fn parse_daily_closes(symbol: &str, data: &Value) -> Result<(f64, f64)> {
    // Check for API error messages
    if let Some(error) = data.get("Error Message") {
        return Err(AlertError::quote(symbol, error.to_string()));
    }

    // "Note" is the classic rate-limit reply, "Information" the newer quota one
    for key in ["Note", "Information"] {
        if let Some(note) = data.get(key) {
            return Err(AlertError::quote(symbol, format!("rate limited: {note}")));
        }
    }

    let series = data
        .get(DAILY_SERIES_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| AlertError::quote(symbol, "No daily data found"))?;

    let mut days: Vec<(NaiveDate, &Value)> = series
        .iter()
        .filter_map(|(date, record)| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .map(|day| (day, record))
        })
        .collect();
    days.sort_unstable_by(|a, b| b.0.cmp(&a.0));

    match days.as_slice() {
        [(recent_day, recent), (previous_day, previous), ..] => Ok((
            read_close(symbol, *recent_day, recent)?,
            read_close(symbol, *previous_day, previous)?,
        )),
        _ => Err(AlertError::quote(
            symbol,
            format!("need two daily records, found {}", days.len()),
        )),
    }
}

fn read_close(symbol: &str, day: NaiveDate, record: &Value) -> Result<f64> {
    let close = match record.get(CLOSE_KEY) {
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };

    close
        .filter(|c| c.is_finite())
        .ok_or_else(|| AlertError::quote(symbol, format!("missing or invalid close on {day}")))
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
    async fn quote(&self, symbol: &str) -> QuoteResult {
        match self.fetch_daily_closes(symbol).await {
            Ok((recent, previous)) => QuoteResult::from_closes(recent, previous),
            Err(e) => {
                warn!(symbol, error = %e, "quote unavailable, using zero quote");
                QuoteResult::SENTINEL
            }
        }
    }
}
