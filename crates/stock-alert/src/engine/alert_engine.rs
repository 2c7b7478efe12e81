//! Alert engine - runs the quote, news, shorten, send pipeline per ticker

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::api::{AlphaVantageClient, BitlyClient, LogNotifier, NewsApiClient, TwilioClient};
use crate::config::AlertConfig;
use crate::error::{AlertError, Result};
use crate::message::{AlertMessage, MAX_ARTICLES};
use crate::models::{Headline, NewsItem, TickerConfig};
use crate::provider::{LinkShortener, NewsProvider, Notifier, QuoteProvider};

use super::outcome::{NoAlertReason, RunReport, Stage, TickerOutcome};

/// Alert engine
///
/// Tickers are processed one at a time, in watchlist order. Each ticker's
/// pipeline is its own fault boundary: a failure ends that ticker in
/// [`TickerOutcome::Failed`] and the loop moves on.
pub struct AlertEngine {
    config: Arc<AlertConfig>,
    quotes: Arc<dyn QuoteProvider>,
    news: Arc<dyn NewsProvider>,
    shortener: Arc<dyn LinkShortener>,
    notifier: Arc<dyn Notifier>,
}

impl AlertEngine {
    pub fn new(
        config: Arc<AlertConfig>,
        quotes: Arc<dyn QuoteProvider>,
        news: Arc<dyn NewsProvider>,
        shortener: Arc<dyn LinkShortener>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            quotes,
            news,
            shortener,
            notifier,
        }
    }

    /// Wire the production HTTP clients. With `dry_run` alerts are logged
    /// instead of sent.
    pub fn from_config(config: Arc<AlertConfig>, dry_run: bool) -> Result<Self> {
        let quotes = Arc::new(AlphaVantageClient::from_config(&config)?);
        let news = Arc::new(NewsApiClient::from_config(&config)?);
        let shortener = Arc::new(BitlyClient::from_config(&config)?);
        let notifier: Arc<dyn Notifier> = if dry_run {
            Arc::new(LogNotifier)
        } else {
            Arc::new(TwilioClient::from_config(&config)?)
        };

        Ok(Self::new(config, quotes, news, shortener, notifier))
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Process every ticker in the watchlist
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::new();

        for ticker in &self.config.watchlist {
            let outcome = self.process_ticker(ticker).await;
            report.record(ticker.symbol.clone(), outcome);
        }

        report.finish();
        report
    }

    /// Run the pipeline for one ticker.
    ///
    /// Quote, threshold check, news, link shortening, formatting, send. An
    /// alert goes out only when the threshold is crossed *and* at least one
    /// article was found.
    #[instrument(skip(self, ticker), fields(symbol = %ticker.symbol))]
    pub async fn process_ticker(&self, ticker: &TickerConfig) -> TickerOutcome {
        let quote = self.quotes.quote(&ticker.symbol).await;
        if quote.is_sentinel() {
            debug!("no quote available, skipping");
            return TickerOutcome::NoAlert {
                reason: NoAlertReason::BelowThreshold,
                quote,
            };
        }
        debug!(
            recent = quote.most_recent_close,
            previous = quote.previous_close,
            change = quote.percent_change,
            "quote"
        );

        if !quote.exceeds_threshold() {
            return TickerOutcome::NoAlert {
                reason: NoAlertReason::BelowThreshold,
                quote,
            };
        }

        let mut headlines = match self
            .news
            .latest_headlines(&ticker.company, MAX_ARTICLES)
            .await
        {
            Ok(headlines) => headlines,
            Err(e) => return failed(Stage::FetchNews, &e),
        };

        if headlines.is_empty() {
            return TickerOutcome::NoAlert {
                reason: NoAlertReason::NoNews,
                quote,
            };
        }
        headlines.truncate(MAX_ARTICLES);

        let news_items = match self.shorten_all(headlines).await {
            Ok(items) => items,
            Err(e) => return failed(Stage::ShortenLinks, &e),
        };

        let message = AlertMessage::new(&ticker.symbol, &quote, news_items);
        match self.notifier.send(&message.render()).await {
            Ok(()) => TickerOutcome::Alerted { message },
            Err(e) => failed(Stage::Send, &e),
        }
    }

    async fn shorten_all(&self, headlines: Vec<Headline>) -> Result<Vec<NewsItem>> {
        let mut items = Vec::with_capacity(headlines.len());

        for Headline { title, url } in headlines {
            let shortened_url = match self.shortener.shorten(&url).await {
                Ok(link) => link,
                Err(e) if self.config.shorten_fallback => {
                    warn!(%url, error = %e, "shortening failed, keeping long link");
                    url
                }
                Err(e) => return Err(e),
            };

            items.push(NewsItem {
                headline: title,
                shortened_url,
            });
        }

        Ok(items)
    }
}

fn failed(stage: Stage, error: &AlertError) -> TickerOutcome {
    TickerOutcome::Failed {
        stage,
        error: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::models::QuoteResult;
    use crate::provider::{MockLinkShortener, MockNewsProvider, MockNotifier, MockQuoteProvider};
    use mockall::predicate::eq;

    fn headline(title: &str, url: &str) -> Headline {
        Headline {
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    fn quotes_returning(recent: f64, previous: f64) -> MockQuoteProvider {
        let mut quotes = MockQuoteProvider::new();
        quotes
            .expect_quote()
            .returning(move |_| QuoteResult::from_closes(recent, previous));
        quotes
    }

    fn news_returning(headlines: Vec<Headline>) -> MockNewsProvider {
        let mut news = MockNewsProvider::new();
        news.expect_latest_headlines()
            .with(eq("tesla"), eq(MAX_ARTICLES))
            .times(1)
            .returning(move |_, _| Ok(headlines.clone()));
        news
    }

    fn shortener_ok() -> MockLinkShortener {
        let mut shortener = MockLinkShortener::new();
        shortener.expect_shorten().returning(|url| {
            let slug = url.rsplit('/').next().unwrap_or_default();
            Ok(format!("https://bit.ly/{slug}"))
        });
        shortener
    }

    fn unused_news() -> MockNewsProvider {
        let mut news = MockNewsProvider::new();
        news.expect_latest_headlines().never();
        news
    }

    fn unused_shortener() -> MockLinkShortener {
        let mut shortener = MockLinkShortener::new();
        shortener.expect_shorten().never();
        shortener
    }

    fn unused_notifier() -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().never();
        notifier
    }

    fn engine(
        config: AlertConfig,
        quotes: MockQuoteProvider,
        news: MockNewsProvider,
        shortener: MockLinkShortener,
        notifier: MockNotifier,
    ) -> AlertEngine {
        AlertEngine::new(
            Arc::new(config),
            Arc::new(quotes),
            Arc::new(news),
            Arc::new(shortener),
            Arc::new(notifier),
        )
    }

    fn tesla() -> TickerConfig {
        TickerConfig::new("TSLA", "tesla")
    }

    #[tokio::test]
    async fn test_below_threshold_skips_news() {
        let engine = engine(
            test_config(),
            quotes_returning(100.0, 105.0),
            unused_news(),
            unused_shortener(),
            unused_notifier(),
        );

        let outcome = engine.process_ticker(&tesla()).await;
        assert_eq!(
            outcome,
            TickerOutcome::NoAlert {
                reason: NoAlertReason::BelowThreshold,
                quote: QuoteResult::from_closes(100.0, 105.0),
            }
        );
    }

    #[tokio::test]
    async fn test_sentinel_quote_is_no_alert() {
        let mut quotes = MockQuoteProvider::new();
        quotes
            .expect_quote()
            .with(eq("TSLA"))
            .times(1)
            .returning(|_| QuoteResult::SENTINEL);

        let engine = engine(
            test_config(),
            quotes,
            unused_news(),
            unused_shortener(),
            unused_notifier(),
        );

        let outcome = engine.process_ticker(&tesla()).await;
        assert!(matches!(
            outcome,
            TickerOutcome::NoAlert {
                reason: NoAlertReason::BelowThreshold,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_alert_sent_with_shortened_links() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .with(eq(
                "TSLA: 🔺 14.3%\n\
                 Tesla recalls vehicles\nhttps://bit.ly/recall\n\
                 Deliveries miss\nhttps://bit.ly/deliveries\n"
                    .to_string(),
            ))
            .times(1)
            .returning(|_| Ok(()));

        let engine = engine(
            test_config(),
            quotes_returning(90.0, 105.0),
            news_returning(vec![
                headline("Tesla recalls vehicles", "https://news.example.com/recall"),
                headline("Deliveries miss", "https://news.example.com/deliveries"),
            ]),
            shortener_ok(),
            notifier,
        );

        let outcome = engine.process_ticker(&tesla()).await;
        let TickerOutcome::Alerted { message } = outcome else {
            panic!("expected an alert, got {outcome:?}");
        };
        assert_eq!(message.ticker, "TSLA");
        assert_eq!(message.percent_magnitude, 14.3);
        assert_eq!(message.news_items.len(), 2);
    }

    #[tokio::test]
    async fn test_no_news_suppresses_alert() {
        let engine = engine(
            test_config(),
            quotes_returning(90.0, 105.0),
            news_returning(vec![]),
            unused_shortener(),
            unused_notifier(),
        );

        let outcome = engine.process_ticker(&tesla()).await;
        assert!(matches!(
            outcome,
            TickerOutcome::NoAlert {
                reason: NoAlertReason::NoNews,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_news_failure_is_scoped_to_ticker() {
        let mut news = MockNewsProvider::new();
        news.expect_latest_headlines()
            .returning(|_, _| Err(AlertError::NewsError("apiKeyInvalid".to_string())));

        let engine = engine(
            test_config(),
            quotes_returning(90.0, 105.0),
            news,
            unused_shortener(),
            unused_notifier(),
        );

        let outcome = engine.process_ticker(&tesla()).await;
        let TickerOutcome::Failed { stage, error } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(stage, Stage::FetchNews);
        assert!(error.contains("apiKeyInvalid"));
    }

    #[tokio::test]
    async fn test_shorten_failure_falls_back_to_long_link() {
        let mut shortener = MockLinkShortener::new();
        shortener
            .expect_shorten()
            .returning(|_| Err(AlertError::ShortenError("FORBIDDEN".to_string())));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .with(eq(
                "TSLA: 🔻 10.0%\nTesla rallies\nhttps://news.example.com/rally\n".to_string(),
            ))
            .times(1)
            .returning(|_| Ok(()));

        let engine = engine(
            test_config(),
            quotes_returning(110.0, 100.0),
            news_returning(vec![headline("Tesla rallies", "https://news.example.com/rally")]),
            shortener,
            notifier,
        );

        assert!(engine.process_ticker(&tesla()).await.is_alerted());
    }

    #[tokio::test]
    async fn test_shorten_failure_without_fallback_fails_ticker() {
        let mut config = test_config();
        config.shorten_fallback = false;

        let mut shortener = MockLinkShortener::new();
        shortener
            .expect_shorten()
            .times(1)
            .returning(|_| Err(AlertError::ShortenError("FORBIDDEN".to_string())));

        let engine = engine(
            config,
            quotes_returning(90.0, 105.0),
            news_returning(vec![
                headline("a", "https://news.example.com/a"),
                headline("b", "https://news.example.com/b"),
            ]),
            shortener,
            unused_notifier(),
        );

        let outcome = engine.process_ticker(&tesla()).await;
        assert!(matches!(
            outcome,
            TickerOutcome::Failed {
                stage: Stage::ShortenLinks,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_send_failure_is_reported() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .times(1)
            .returning(|_| Err(AlertError::SendError("invalid 'To' number".to_string())));

        let engine = engine(
            test_config(),
            quotes_returning(90.0, 105.0),
            news_returning(vec![headline("a", "https://news.example.com/a")]),
            shortener_ok(),
            notifier,
        );

        let outcome = engine.process_ticker(&tesla()).await;
        assert!(matches!(
            outcome,
            TickerOutcome::Failed {
                stage: Stage::Send,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_extra_headlines_are_not_shortened() {
        let mut shortener = MockLinkShortener::new();
        shortener
            .expect_shorten()
            .times(MAX_ARTICLES)
            .returning(|url| Ok(url.to_string()));

        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(1).returning(|_| Ok(()));

        let engine = engine(
            test_config(),
            quotes_returning(90.0, 105.0),
            news_returning(vec![
                headline("a", "https://news.example.com/a"),
                headline("b", "https://news.example.com/b"),
                headline("c", "https://news.example.com/c"),
            ]),
            shortener,
            notifier,
        );

        assert!(engine.process_ticker(&tesla()).await.is_alerted());
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_next_ticker() {
        let mut config = test_config();
        config.shorten_fallback = false;
        config.watchlist = vec![
            TickerConfig::new("TSLA", "tesla"),
            TickerConfig::new("MSFT", "microsoft"),
        ];

        let mut quotes = MockQuoteProvider::new();
        quotes
            .expect_quote()
            .times(2)
            .returning(|_| QuoteResult::from_closes(90.0, 105.0));

        let mut news = MockNewsProvider::new();
        news.expect_latest_headlines()
            .times(2)
            .returning(|company, _| {
                Ok(vec![Headline {
                    title: format!("{company} moves"),
                    url: format!("https://news.example.com/{company}"),
                }])
            });

        let mut shortener = MockLinkShortener::new();
        shortener
            .expect_shorten()
            .with(eq("https://news.example.com/tesla"))
            .times(1)
            .returning(|_| Err(AlertError::ShortenError("timeout".to_string())));
        shortener
            .expect_shorten()
            .with(eq("https://news.example.com/microsoft"))
            .times(1)
            .returning(|_| Ok("https://bit.ly/msft".to_string()));

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .with(eq("MSFT: 🔺 14.3%\nmicrosoft moves\nhttps://bit.ly/msft\n".to_string()))
            .times(1)
            .returning(|_| Ok(()));

        let engine = engine(config, quotes, news, shortener, notifier);
        let report = engine.run().await;

        assert_eq!(report.tickers.len(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.alerted(), 1);
        assert!(report.outcome("TSLA").is_some_and(TickerOutcome::is_failed));
        assert!(report.outcome("MSFT").is_some_and(TickerOutcome::is_alerted));
        assert_eq!(report.tickers[0].symbol, "TSLA");
    }

    #[tokio::test]
    async fn test_run_over_quiet_market() {
        let engine = engine(
            test_config(),
            quotes_returning(100.0, 101.0),
            unused_news(),
            unused_shortener(),
            unused_notifier(),
        );

        let report = engine.run().await;
        assert_eq!(report.tickers.len(), AlertConfig::default_watchlist().len());
        assert_eq!(report.no_alert(), report.tickers.len());
    }

    #[test]
    fn test_from_config_wires_clients() {
        let engine = AlertEngine::from_config(Arc::new(test_config()), true).unwrap();
        assert_eq!(engine.config().watchlist.len(), 2);
    }
}
