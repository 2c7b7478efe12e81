//! Percentage change between the two most recent closes
//!
//! The change is measured from the previous close: `(previous - recent) /
//! previous * 100`, so it is positive when the price fell and negative when it
//! rose. Results are rounded to one decimal place, half away from zero
//! (`f64::round`).

/// Absolute percent change that triggers an alert. Strictly greater than.
pub const ALERT_THRESHOLD_PERCENT: f64 = 5.0;

/// Compute the rounded percent change from `previous` to `recent`.
///
/// A zero or non-finite previous close yields `0.0` so a degenerate quote never
/// crosses the threshold.
pub fn percent_change(most_recent_close: f64, previous_close: f64) -> f64 {
    if previous_close.abs() < f64::EPSILON
        || !previous_close.is_finite()
        || !most_recent_close.is_finite()
    {
        return 0.0;
    }

    round_to_tenth((previous_close - most_recent_close) / previous_close * 100.0)
}

/// Round to one decimal place, half away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whether a percent change is large enough to alert on
pub fn exceeds_threshold(percent_change: f64) -> bool {
    percent_change.abs() > ALERT_THRESHOLD_PERCENT
}
