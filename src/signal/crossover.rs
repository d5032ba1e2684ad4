//! Crossover detection
//!
//! Edge-triggered: fires only on the period where the EMA moves from at or
//! below the smoothed SMA to strictly above it.

use crate::config::IndicatorConfig;
use crate::indicators::IndicatorSnapshot;
use crate::market::Instrument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// True iff every value is present, `previous.ema <= previous.smoothed_sma`
/// and `current.ema > current.smoothed_sma`
pub fn confirm_cross(current: &IndicatorSnapshot, previous: &IndicatorSnapshot) -> bool {
    match (
        current.ema,
        current.smoothed_sma,
        previous.ema,
        previous.smoothed_sma,
    ) {
        (Some(cur_ema), Some(cur_sma), Some(prev_ema), Some(prev_sma)) => {
            prev_ema <= prev_sma && cur_ema > cur_sma
        }
        _ => false,
    }
}

/// A confirmed bullish crossover for one instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossoverSignal {
    /// Instrument the cross was detected on
    pub instrument: Instrument,
    /// Snapshot over the full window
    pub current: IndicatorSnapshot,
    /// Snapshot over the window minus its final point
    pub previous: IndicatorSnapshot,
    /// Last close of the window
    pub price: f64,
    /// When the cross was confirmed
    pub detected_at: DateTime<Utc>,
}

impl CrossoverSignal {
    /// Evaluate `closes` (oldest first) and return a signal if a fresh
    /// upward cross is confirmed at the last point
    pub fn detect(
        instrument: &Instrument,
        closes: &[f64],
        params: &IndicatorConfig,
    ) -> Option<Self> {
        let price = *closes.last()?;
        let (current, previous) = IndicatorSnapshot::pair(closes, params);

        if !confirm_cross(&current, &previous) {
            return None;
        }

        Some(Self {
            instrument: instrument.clone(),
            current,
            previous,
            price,
            detected_at: Utc::now(),
        })
    }
}
