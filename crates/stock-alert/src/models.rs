//! Data model for a single alert run
//!
//! Everything here lives for one invocation only; nothing is persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AlertError;
use crate::evaluator;

/// A watched ticker and the company name used as the news search keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerConfig {
    pub symbol: String,
    pub company: String,
}

impl TickerConfig {
    pub fn new(symbol: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company: company.into(),
        }
    }
}

/// Parses `SYMBOL:company`, as used by `--ticker` and `STOCK_ALERT_WATCHLIST`
impl FromStr for TickerConfig {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, company) = s.split_once(':').ok_or_else(|| {
            AlertError::ConfigError(format!("ticker '{s}' must be written as SYMBOL:company"))
        })?;

        let symbol = symbol.trim();
        let company = company.trim();
        if symbol.is_empty() || company.is_empty() {
            return Err(AlertError::ConfigError(format!(
                "ticker '{s}' has an empty symbol or company"
            )));
        }

        Ok(Self::new(symbol, company))
    }
}

/// The two most recent closes and the change between them
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct QuoteResult {
    pub most_recent_close: f64,
    pub previous_close: f64,
    /// Rounded to one decimal; positive when the price fell
    pub percent_change: f64,
}

impl QuoteResult {
    /// All-zero placeholder returned when a quote cannot be fetched
    pub const SENTINEL: Self = Self {
        most_recent_close: 0.0,
        previous_close: 0.0,
        percent_change: 0.0,
    };

    pub fn from_closes(most_recent_close: f64, previous_close: f64) -> Self {
        Self {
            most_recent_close,
            previous_close,
            percent_change: evaluator::percent_change(most_recent_close, previous_close),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    pub fn exceeds_threshold(&self) -> bool {
        evaluator::exceeds_threshold(self.percent_change)
    }
}

/// A raw search hit from the news provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub url: String,
}

/// A headline ready to be sent, with its link shortened (or kept as-is when
/// shortening fell back)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub headline: String,
    pub shortened_url: String,
}

/// Arrow glyph placed in front of the move.
///
/// Selected from the sign of `percent_change`: a positive change (the price
/// fell) shows `Up`, a negative change shows `Down`. This mirrors the alerts
/// subscribers already receive; flag it before flipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Arrow {
    Up,
    Down,
}

impl Arrow {
    pub fn for_change(percent_change: f64) -> Self {
        if percent_change < 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Up => "🔺",
            Self::Down => "🔻",
        }
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}
