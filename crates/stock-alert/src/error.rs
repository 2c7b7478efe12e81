//! Error types for stock alert operations

use thiserror::Error;

/// Stock alert specific errors
#[derive(Debug, Error)]
pub enum AlertError {
    /// Configuration error, fatal before any ticker is processed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Quote lookup failed or returned an unusable payload
    #[error("Quote error for {symbol}: {reason}")]
    QuoteError { symbol: String, reason: String },

    /// News search failed
    #[error("News error: {0}")]
    NewsError(String),

    /// Link shortening failed
    #[error("Shorten error: {0}")]
    ShortenError(String),

    /// Message delivery failed
    #[error("Send error: {0}")]
    SendError(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Watchlist file parsing error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Reading a watchlist file failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AlertError {
    pub(crate) fn quote(symbol: &str, reason: impl Into<String>) -> Self {
        Self::QuoteError {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for stock alert operations
pub type Result<T> = std::result::Result<T, AlertError>;
