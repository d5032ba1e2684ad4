//! Universe provider
//!
//! Fetches the full ticker set, applies the exclusion and volume filters,
//! ranks by volume and partitions the watch-list into rotating groups.

mod filter;
mod groups;

pub use filter::UniverseFilter;
pub use groups::{group_size, partition, WatchGroup};

use crate::config::UniverseConfig;
use crate::market::{Instrument, MarketDataProvider, ProviderError};
use crate::retry::{RetryPolicy, Sleeper};
use std::sync::Arc;

/// Builds the filtered, ranked watch-list from the market-data provider
pub struct UniverseProvider {
    provider: Arc<dyn MarketDataProvider>,
    sleeper: Arc<dyn Sleeper>,
    filter: UniverseFilter,
    policy: RetryPolicy,
    min_group_size: usize,
    num_groups: usize,
}

impl UniverseProvider {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        sleeper: Arc<dyn Sleeper>,
        config: &UniverseConfig,
    ) -> Self {
        Self {
            provider,
            sleeper,
            filter: UniverseFilter::from(config),
            policy: config.retry.policy(),
            min_group_size: config.min_group_size,
            num_groups: config.num_groups,
        }
    }

    /// Fetch and filter the universe, propagating provider failures
    pub async fn try_fetch_universe(&self) -> Result<Vec<Instrument>, ProviderError> {
        let raw = self
            .policy
            .run(self.sleeper.as_ref(), "universe", |_| {
                self.provider.list_instruments()
            })
            .await?;
        let received = raw.len();
        let filtered = self.filter.apply(raw);

        tracing::info!(
            received,
            watchlist = filtered.len(),
            "Universe refreshed"
        );
        for instrument in &filtered {
            tracing::debug!(
                symbol = %instrument.display_symbol(),
                volume = %instrument.volume_24h,
                "Passed volume filter"
            );
        }

        Ok(filtered)
    }

    /// Fetch and filter the universe; an empty list means nothing to scan
    pub async fn fetch_universe(&self) -> Vec<Instrument> {
        match self.try_fetch_universe().await {
            Ok(instruments) => instruments,
            Err(e) => {
                tracing::error!(error = %e, "Universe provider unavailable, skipping this pass");
                Vec::new()
            }
        }
    }

    /// Fetch the universe and split it into watch-groups
    pub async fn fetch_groups(&self) -> Vec<WatchGroup> {
        let instruments = self.fetch_universe().await;
        partition(instruments, self.min_group_size, self.num_groups)
    }
}
