//! Shared utilities for stock-alert
//!
//! Holds the tracing bootstrap used by the binary so the library crate stays
//! free of subscriber setup.

pub mod logging;

pub use logging::{LogFormat, init_tracing_with};
