//! Indicator engine
//!
//! Stateless functions over an ordered close-price series (oldest first).

mod moving_average;
mod rsi;

pub use moving_average::{ema, ema_last, sma, smoothed_sma};
pub use rsi::{rsi, RsiSmoothing};

use crate::config::IndicatorConfig;
use serde::{Deserialize, Serialize};

/// Indicator values derived from one price window.
///
/// Each value is absent when the window is too short for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// EMA over `ema_span`
    pub ema: Option<f64>,
    /// Two-stage smoothed SMA over `sma_window`
    pub smoothed_sma: Option<f64>,
    /// RSI over `rsi_period`
    pub rsi: Option<f64>,
}

impl IndicatorSnapshot {
    /// Compute all indicators over `closes`
    pub fn compute(closes: &[f64], params: &IndicatorConfig) -> Self {
        Self {
            ema: ema_last(closes, params.ema_span),
            smoothed_sma: smoothed_sma(closes, params.sma_window),
            rsi: rsi(closes, params.rsi_period, params.rsi_smoothing),
        }
    }

    /// Snapshots for the full window ("current") and the window without its
    /// final point ("previous")
    pub fn pair(closes: &[f64], params: &IndicatorConfig) -> (Self, Self) {
        let previous_len = closes.len().saturating_sub(1);
        (
            Self::compute(closes, params),
            Self::compute(&closes[..previous_len], params),
        )
    }

    /// Fast average strictly above the slow one; absent if either is missing
    pub fn is_above(&self) -> Option<bool> {
        Some(self.ema? > self.smoothed_sma?)
    }
}
