//! Alert engine
//!
//! Per-ticker pipeline and the run loop over the watchlist

pub mod alert_engine;
pub mod outcome;

pub use alert_engine::AlertEngine;
pub use outcome::{NoAlertReason, RunReport, Stage, TickerOutcome};
