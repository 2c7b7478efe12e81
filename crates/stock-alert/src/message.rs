//! Alert message assembly and text rendering

use std::fmt;

use serde::Serialize;

use crate::models::{Arrow, NewsItem, QuoteResult};

/// Upper bound on headlines carried by one alert
pub const MAX_ARTICLES: usize = 2;

/// A text alert for one ticker whose move crossed the threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertMessage {
    pub ticker: String,
    pub arrow: Arrow,
    pub percent_magnitude: f64,
    pub news_items: Vec<NewsItem>,
}

impl AlertMessage {
    pub fn new(ticker: &str, quote: &QuoteResult, mut news_items: Vec<NewsItem>) -> Self {
        news_items.truncate(MAX_ARTICLES);

        Self {
            ticker: ticker.to_uppercase(),
            arrow: Arrow::for_change(quote.percent_change),
            percent_magnitude: quote.percent_change.abs(),
            news_items,
        }
    }

    /// Render the SMS body.
    ///
    /// ```text
    /// TSLA: 🔺 14.3%
    /// <headline>
    /// <short link>
    /// ```
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} {:.1}%",
            self.ticker, self.arrow, self.percent_magnitude
        )?;
        for item in &self.news_items {
            writeln!(f, "{}\n{}", item.headline, item.shortened_url)?;
        }
        Ok(())
    }
}
