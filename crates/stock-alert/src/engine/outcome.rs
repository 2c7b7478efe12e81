//! Per-ticker outcomes and the run report

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::message::AlertMessage;
use crate::models::QuoteResult;

/// Pipeline step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    FetchNews,
    ShortenLinks,
    Send,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FetchNews => "fetch_news",
            Self::ShortenLinks => "shorten_links",
            Self::Send => "send",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoAlertReason {
    /// |change| did not exceed the threshold (includes the zero quote)
    BelowThreshold,
    /// Threshold crossed but the news search came back empty
    NoNews,
}

/// Terminal state of one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TickerOutcome {
    NoAlert {
        reason: NoAlertReason,
        quote: QuoteResult,
    },
    Alerted {
        message: AlertMessage,
    },
    Failed {
        stage: Stage,
        error: String,
    },
}

impl TickerOutcome {
    pub fn is_alerted(&self) -> bool {
        matches!(self, Self::Alerted { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn log(&self, symbol: &str) {
        match self {
            Self::NoAlert { reason, quote } => info!(
                symbol,
                change = quote.percent_change,
                ?reason,
                "no alert"
            ),
            Self::Alerted { message } => info!(
                symbol,
                articles = message.news_items.len(),
                "alert sent"
            ),
            Self::Failed { stage, error } => {
                error!(symbol, %stage, error = %error, "alert failed");
            }
        }
    }
}

/// One ticker's entry in the report
#[derive(Debug, Clone, Serialize)]
pub struct TickerReport {
    pub symbol: String,
    pub outcome: TickerOutcome,
}

/// Everything that happened during one run, in watchlist order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub tickers: Vec<TickerReport>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            tickers: Vec::new(),
        }
    }

    /// Log and store the outcome for `symbol`
    pub fn record(&mut self, symbol: impl Into<String>, outcome: TickerOutcome) {
        let symbol = symbol.into();
        outcome.log(&symbol);
        self.tickers.push(TickerReport { symbol, outcome });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        info!(
            processed = self.tickers.len(),
            alerted = self.alerted(),
            no_alert = self.no_alert(),
            failed = self.failed(),
            "run complete"
        );
    }

    pub fn outcome(&self, symbol: &str) -> Option<&TickerOutcome> {
        self.tickers
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| &t.outcome)
    }

    pub fn alerted(&self) -> usize {
        self.tickers.iter().filter(|t| t.outcome.is_alerted()).count()
    }

    pub fn failed(&self) -> usize {
        self.tickers.iter().filter(|t| t.outcome.is_failed()).count()
    }

    pub fn no_alert(&self) -> usize {
        self.tickers.len() - self.alerted() - self.failed()
    }
}
