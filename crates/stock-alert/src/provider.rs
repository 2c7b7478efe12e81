//! Seams between the alert engine and the outside world
//!
//! Each external service sits behind one of these traits so the engine can be
//! driven by mocks in tests and by the HTTP clients in [`crate::api`] in
//! production.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Headline, QuoteResult};

/// Source of the two most recent daily closes for a symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Never fails: any upstream fault yields [`QuoteResult::SENTINEL`].
    async fn quote(&self, symbol: &str) -> QuoteResult;
}

/// Full-text news search, newest first
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn latest_headlines(&self, company: &str, limit: usize) -> Result<Vec<Headline>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkShortener: Send + Sync {
    async fn shorten(&self, long_url: &str) -> Result<String>;
}

/// Outbound delivery of a finished alert
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, body: &str) -> Result<()>;
}
