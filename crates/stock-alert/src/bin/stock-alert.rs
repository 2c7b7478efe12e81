//! Stock alert CLI
//!
//! Runs the watchlist once and exits. Meant to be scheduled after market
//! close.
//!
//! # Usage
//!
//! ```bash
//! export ALPHA_VANTAGE_API_KEY=... NEWS_API_KEY=... BITLY_TOKEN=...
//! export TWILIO_ACCOUNT_SID=... TWILIO_AUTH_TOKEN=...
//! export TWILIO_FROM_NUMBER=+15005550006 ALERT_TO_NUMBER=+11234567890
//!
//! cargo run --bin stock-alert -- --ticker TSLA:tesla --ticker MSFT:microsoft
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alert_utils::LogFormat;
use anyhow::Context;
use clap::Parser;
use stock_alert::config::load_watchlist;
use stock_alert::{AlertConfig, AlertEngine, TickerConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stock-alert")]
#[command(about = "Text me when a watched stock moves more than 5%", long_about = None)]
struct Args {
    /// TOML watchlist file with [[ticker]] entries
    #[arg(short, long, value_name = "PATH")]
    watchlist: Option<PathBuf>,

    /// Watch SYMBOL, searching news for COMPANY (repeatable, overrides --watchlist)
    #[arg(short, long = "ticker", value_name = "SYMBOL:COMPANY")]
    tickers: Vec<TickerConfig>,

    /// Timeout for each outbound request
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Fail the ticker instead of sending the long link when shortening fails
    #[arg(long)]
    no_shorten_fallback: bool,

    /// Log the message instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    report_json: bool,

    /// Log output format: plain or json
    #[arg(long, default_value = "plain")]
    log_format: LogFormat,
}

fn build_config(args: &Args) -> anyhow::Result<AlertConfig> {
    let mut builder = AlertConfig::builder()
        .with_env()?
        .shorten_fallback(!args.no_shorten_fallback);

    if let Some(path) = &args.watchlist {
        let watchlist = load_watchlist(path)
            .with_context(|| format!("reading watchlist {}", path.display()))?;
        builder = builder.watchlist(watchlist);
    }

    if !args.tickers.is_empty() {
        builder = builder.watchlist(args.tickers.clone());
    }

    if let Some(secs) = args.timeout_secs {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }

    Ok(builder.build()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    alert_utils::init_tracing_with(args.log_format);

    let config = Arc::new(build_config(&args)?);
    info!(
        tickers = config.watchlist.len(),
        dry_run = args.dry_run,
        "starting stock alert run"
    );

    let engine = AlertEngine::from_config(config, args.dry_run)?;
    let report = engine.run().await;

    if args.report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
