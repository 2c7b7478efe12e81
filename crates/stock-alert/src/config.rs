//! Configuration for an alert run
//!
//! Built once at startup, validated, then shared read-only with every
//! collaborator. Credentials and phone numbers come from the environment; the
//! watchlist can also come from a TOML file or the command line.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AlertError, Result};
use crate::models::TickerConfig;

pub const ENV_ALPHA_VANTAGE_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const ENV_TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const ENV_BITLY_TOKEN: &str = "BITLY_TOKEN";
pub const ENV_FROM_NUMBER: &str = "TWILIO_FROM_NUMBER";
pub const ENV_TO_NUMBER: &str = "ALERT_TO_NUMBER";
pub const ENV_WATCHLIST: &str = "STOCK_ALERT_WATCHLIST";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// API credentials for the four external services
#[derive(Clone)]
pub struct Credentials {
    pub alpha_vantage_api_key: String,
    pub news_api_key: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub bitly_token: String,
}

// Keeps secrets out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("alpha_vantage_api_key", &"***")
            .field("news_api_key", &"***")
            .field("twilio_account_sid", &self.twilio_account_sid)
            .field("twilio_auth_token", &"***")
            .field("bitly_token", &"***")
            .finish()
    }
}

/// Configuration for an alert run
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Tickers processed in order
    pub watchlist: Vec<TickerConfig>,

    pub credentials: Credentials,

    /// Sender number registered with the messaging provider
    pub from_number: String,

    /// Recipient of every alert
    pub to_number: String,

    /// Per-request timeout for every outbound call
    pub request_timeout: Duration,

    /// Keep the long URL when shortening fails instead of failing the ticker
    pub shorten_fallback: bool,
}

impl AlertConfig {
    /// Create a new configuration builder
    pub fn builder() -> AlertConfigBuilder {
        AlertConfigBuilder::default()
    }

    /// Watchlist used when none is configured
    pub fn default_watchlist() -> Vec<TickerConfig> {
        vec![
            TickerConfig::new("TSLA", "tesla"),
            TickerConfig::new("MSFT", "microsoft"),
        ]
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let creds = &self.credentials;
        for (name, value) in [
            (ENV_ALPHA_VANTAGE_API_KEY, &creds.alpha_vantage_api_key),
            (ENV_NEWS_API_KEY, &creds.news_api_key),
            (ENV_TWILIO_ACCOUNT_SID, &creds.twilio_account_sid),
            (ENV_TWILIO_AUTH_TOKEN, &creds.twilio_auth_token),
            (ENV_BITLY_TOKEN, &creds.bitly_token),
        ] {
            if value.trim().is_empty() {
                return Err(AlertError::ConfigError(format!("{name} is empty")));
            }
        }

        for (name, number) in [
            (ENV_FROM_NUMBER, &self.from_number),
            (ENV_TO_NUMBER, &self.to_number),
        ] {
            if !is_e164(number) {
                return Err(AlertError::ConfigError(format!(
                    "{name} must look like +11234567890, got '{number}'"
                )));
            }
        }

        if self.watchlist.is_empty() {
            return Err(AlertError::ConfigError("watchlist is empty".to_string()));
        }

        for ticker in &self.watchlist {
            if ticker.symbol.trim().is_empty() || ticker.company.trim().is_empty() {
                return Err(AlertError::ConfigError(format!(
                    "watchlist entry {ticker:?} has an empty symbol or company"
                )));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(AlertError::ConfigError(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_e164(number: &str) -> bool {
    number.strip_prefix('+').is_some_and(|digits| {
        (8..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
    })
}

#[derive(Debug, Deserialize)]
struct WatchlistFile {
    #[serde(rename = "ticker", default)]
    tickers: Vec<TickerConfig>,
}

/// Parse a watchlist from TOML text.
///
/// ```toml
/// [[ticker]]
/// symbol = "TSLA"
/// company = "tesla"
/// ```
pub fn parse_watchlist_toml(text: &str) -> Result<Vec<TickerConfig>> {
    let file: WatchlistFile = toml::from_str(text)?;
    Ok(file.tickers)
}

/// Load a watchlist from a TOML file
pub fn load_watchlist(path: impl AsRef<Path>) -> Result<Vec<TickerConfig>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_watchlist_toml(&text)
}

/// Parse `SYMBOL:company,SYMBOL:company`
pub fn parse_watchlist_list(list: &str) -> Result<Vec<TickerConfig>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse)
        .collect()
}

/// Builder for AlertConfig
#[derive(Debug, Default)]
pub struct AlertConfigBuilder {
    watchlist: Option<Vec<TickerConfig>>,
    alpha_vantage_api_key: Option<String>,
    news_api_key: Option<String>,
    twilio_account_sid: Option<String>,
    twilio_auth_token: Option<String>,
    bitly_token: Option<String>,
    from_number: Option<String>,
    to_number: Option<String>,
    request_timeout: Option<Duration>,
    shorten_fallback: Option<bool>,
}

impl AlertConfigBuilder {
    /// Set the watchlist
    pub fn watchlist(mut self, watchlist: Vec<TickerConfig>) -> Self {
        self.watchlist = Some(watchlist);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set News API key
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    pub fn twilio_account_sid(mut self, sid: impl Into<String>) -> Self {
        self.twilio_account_sid = Some(sid.into());
        self
    }

    pub fn twilio_auth_token(mut self, token: impl Into<String>) -> Self {
        self.twilio_auth_token = Some(token.into());
        self
    }

    /// Set Bitly access token
    pub fn bitly_token(mut self, token: impl Into<String>) -> Self {
        self.bitly_token = Some(token.into());
        self
    }

    pub fn from_number(mut self, number: impl Into<String>) -> Self {
        self.from_number = Some(number.into());
        self
    }

    pub fn to_number(mut self, number: impl Into<String>) -> Self {
        self.to_number = Some(number.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn shorten_fallback(mut self, enabled: bool) -> Self {
        self.shorten_fallback = Some(enabled);
        self
    }

    /// Load credentials, phone numbers and an optional watchlist from the
    /// process environment
    pub fn with_env(self) -> Result<Self> {
        self.with_env_source(|key| std::env::var(key).ok())
    }

    /// Same as [`with_env`](Self::with_env) but reading through `lookup`
    pub fn with_env_source<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots = [
            (ENV_ALPHA_VANTAGE_API_KEY, &mut self.alpha_vantage_api_key),
            (ENV_NEWS_API_KEY, &mut self.news_api_key),
            (ENV_TWILIO_ACCOUNT_SID, &mut self.twilio_account_sid),
            (ENV_TWILIO_AUTH_TOKEN, &mut self.twilio_auth_token),
            (ENV_BITLY_TOKEN, &mut self.bitly_token),
            (ENV_FROM_NUMBER, &mut self.from_number),
            (ENV_TO_NUMBER, &mut self.to_number),
        ];
        for (key, slot) in slots {
            if let Some(value) = lookup(key) {
                *slot = Some(value);
            }
        }

        if let Some(list) = lookup(ENV_WATCHLIST) {
            self.watchlist = Some(parse_watchlist_list(&list)?);
        }

        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<AlertConfig> {
        fn required(value: Option<String>, name: &str) -> Result<String> {
            value.ok_or_else(|| AlertError::ConfigError(format!("{name} not set")))
        }

        let credentials = Credentials {
            alpha_vantage_api_key: required(self.alpha_vantage_api_key, ENV_ALPHA_VANTAGE_API_KEY)?,
            news_api_key: required(self.news_api_key, ENV_NEWS_API_KEY)?,
            twilio_account_sid: required(self.twilio_account_sid, ENV_TWILIO_ACCOUNT_SID)?,
            twilio_auth_token: required(self.twilio_auth_token, ENV_TWILIO_AUTH_TOKEN)?,
            bitly_token: required(self.bitly_token, ENV_BITLY_TOKEN)?,
        };

        let config = AlertConfig {
            watchlist: self.watchlist.unwrap_or_else(AlertConfig::default_watchlist),
            credentials,
            from_number: required(self.from_number, ENV_FROM_NUMBER)?,
            to_number: required(self.to_number, ENV_TO_NUMBER)?,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            shorten_fallback: self.shorten_fallback.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AlertConfig {
    AlertConfig::builder()
        .alpha_vantage_api_key("av-key")
        .news_api_key("news-key")
        .twilio_account_sid("AC123")
        .twilio_auth_token("twilio-token")
        .bitly_token("bitly-token")
        .from_number("+15005550006")
        .to_number("+11234567890")
        .build()
        .unwrap()
}
