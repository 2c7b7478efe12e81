//! Daily stock move notifier
//!
//! For each ticker in a watchlist this crate fetches the two most recent
//! daily closes, computes the percent change between them and, when the move
//! exceeds 5%, looks up the two newest articles about the company, shortens
//! their links and sends a single text message.
//!
//! - Quotes from Alpha Vantage (`TIME_SERIES_DAILY`)
//! - Headlines from News API (`/v2/everything`)
//! - Short links from Bitly (`/v4/shorten`)
//! - Delivery through Twilio SMS
//!
//! # Architecture
//!
//! [`AlertEngine`] walks the watchlist one ticker at a time and talks to the
//! outside world only through the traits in [`provider`], so every step can
//! be replaced in tests. A failure in one ticker's pipeline is recorded in the
//! [`RunReport`] and the next ticker is processed normally.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stock_alert::{AlertConfig, AlertEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(AlertConfig::builder().with_env()?.build()?);
//!     let engine = AlertEngine::from_config(config, false)?;
//!
//!     let report = engine.run().await;
//!     println!("{} alert(s) sent", report.alerted());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod message;
pub mod models;
pub mod provider;

// Re-export main types for convenience
pub use config::AlertConfig;
pub use engine::{AlertEngine, RunReport, TickerOutcome};
pub use error::{AlertError, Result};
pub use message::AlertMessage;
pub use models::{NewsItem, QuoteResult, TickerConfig};
