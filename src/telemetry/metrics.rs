//! Prometheus metrics
//!
//! Thin helpers over the `metrics` facade. Without an installed recorder
//! every call is a no-op.

use std::time::Duration;

/// Why a history fetch produced no usable series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFailure {
    /// Rate-limit retries exhausted
    RateLimited,
    /// Non-retryable provider error
    Provider,
    /// Fewer points than the indicator windows need
    Insufficient,
}

impl HistoryFailure {
    fn as_str(self) -> &'static str {
        match self {
            HistoryFailure::RateLimited => "rate_limited",
            HistoryFailure::Provider => "provider",
            HistoryFailure::Insufficient => "insufficient",
        }
    }
}

/// Count a throttled provider response
pub fn record_rate_limit() {
    metrics::counter!("cross_scanner_rate_limited_total").increment(1);
}

/// Count an instrument skipped for lack of history
pub fn record_history_failure(reason: HistoryFailure) {
    metrics::counter!("cross_scanner_history_failures_total", "reason" => reason.as_str())
        .increment(1);
}

/// Record a completed scan pass
pub fn record_pass(duration: Duration, scanned: usize, alerts: usize) {
    metrics::counter!("cross_scanner_passes_total").increment(1);
    metrics::counter!("cross_scanner_instruments_scanned_total").increment(scanned as u64);
    metrics::counter!("cross_scanner_crossovers_total").increment(alerts as u64);
    metrics::histogram!("cross_scanner_pass_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_alert_sent() {
    metrics::counter!("cross_scanner_alerts_sent_total").increment(1);
}

pub fn record_alert_dropped() {
    metrics::counter!("cross_scanner_alerts_dropped_total").increment(1);
}

pub fn set_watchlist_size(size: usize) {
    metrics::gauge!("cross_scanner_watchlist_size").set(size as f64);
}

pub fn set_group_count(count: usize) {
    metrics::gauge!("cross_scanner_group_count").set(count as f64);
}
