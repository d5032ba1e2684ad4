//! Universe filtering
//!
//! Applied in order: exclusion set, volume threshold, rank by volume
//! descending, truncate to the watch-list cap.

use crate::config::UniverseConfig;
use crate::market::Instrument;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Filtering policy for the instrument universe
#[derive(Debug, Clone)]
pub struct UniverseFilter {
    exclusions: HashSet<String>,
    min_volume: Decimal,
    max_watchlist: usize,
}

impl UniverseFilter {
    pub fn new<I, S>(exclusions: I, min_volume: Decimal, max_watchlist: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            exclusions: exclusions
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .collect(),
            min_volume,
            max_watchlist,
        }
    }

    /// True if the symbol, id or name is in the exclusion set
    pub fn is_excluded(&self, instrument: &Instrument) -> bool {
        [&instrument.symbol, &instrument.id, &instrument.name]
            .iter()
            .any(|key| self.exclusions.contains(&key.to_lowercase()))
    }

    /// Volume strictly above the configured minimum
    pub fn passes_volume(&self, instrument: &Instrument) -> bool {
        instrument.volume_24h > self.min_volume
    }

    /// Filter, rank and truncate
    pub fn apply(&self, instruments: Vec<Instrument>) -> Vec<Instrument> {
        let mut kept: Vec<Instrument> = instruments
            .into_iter()
            .filter(|i| !self.is_excluded(i))
            .filter(|i| self.passes_volume(i))
            .collect();

        // Stable sort keeps provider order among equal volumes
        kept.sort_by(|a, b| b.volume_24h.cmp(&a.volume_24h));
        kept.truncate(self.max_watchlist);
        kept
    }
}

impl From<&UniverseConfig> for UniverseFilter {
    fn from(config: &UniverseConfig) -> Self {
        Self::new(&config.exclusions, config.min_volume, config.max_watchlist)
    }
}
