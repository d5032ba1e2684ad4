//! Price history fetcher
//!
//! Retrieves recent closing prices for one instrument under the shared
//! retry policy. Every failure mode collapses to an empty series so that a
//! single instrument never aborts a scan pass.

use crate::config::HistoryConfig;
use crate::market::{MarketDataProvider, ProviderError};
use crate::retry::{RetryPolicy, Sleeper};
use crate::telemetry::{record_history_failure, HistoryFailure};
use std::sync::Arc;

/// Fetches closing-price series for indicator computation
pub struct HistoryFetcher {
    provider: Arc<dyn MarketDataProvider>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    min_points: usize,
}

impl HistoryFetcher {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        sleeper: Arc<dyn Sleeper>,
        config: &HistoryConfig,
    ) -> Self {
        Self {
            provider,
            sleeper,
            policy: config.policy(),
            min_points: config.min_points,
        }
    }

    /// Minimum series length accepted
    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Closing prices ordered oldest to newest, or empty when unavailable
    pub async fn fetch_recent_closes(&self, instrument_id: &str) -> Vec<f64> {
        let result = self
            .policy
            .run(self.sleeper.as_ref(), instrument_id, |_| {
                self.provider.recent_candles(instrument_id)
            })
            .await;

        let candles = match result {
            Ok(candles) => candles,
            Err(ProviderError::RateLimited) => {
                tracing::warn!(
                    instrument = instrument_id,
                    attempts = self.policy.max_attempts(),
                    "Rate limit retries exhausted, skipping"
                );
                record_history_failure(HistoryFailure::RateLimited);
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(instrument = instrument_id, error = %e, "History fetch failed");
                record_history_failure(HistoryFailure::Provider);
                return Vec::new();
            }
        };

        if candles.len() < self.min_points {
            tracing::debug!(
                instrument = instrument_id,
                points = candles.len(),
                required = self.min_points,
                "Insufficient history"
            );
            record_history_failure(HistoryFailure::Insufficient);
            return Vec::new();
        }

        candles.into_iter().map(|c| c.close).collect()
    }
}
