//! RSI (Relative Strength Index)
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)

use serde::{Deserialize, Serialize};

/// Averaging applied to gains and losses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSmoothing {
    /// Arithmetic mean of the last `period` changes
    #[default]
    Rolling,
    /// Wilder smoothing: EMA with α = 1/period over all changes
    Wilder,
}

/// RSI over `values` (oldest first).
///
/// Absent when fewer than `period + 1` points exist or when the average
/// loss is zero.
pub fn rsi(values: &[f64], period: usize, smoothing: RsiSmoothing) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = values
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let (avg_gain, avg_loss) = match smoothing {
        RsiSmoothing::Rolling => {
            let tail = gains.len() - period;
            let avg_gain = gains[tail..].iter().sum::<f64>() / period as f64;
            let avg_loss = losses[tail..].iter().sum::<f64>() / period as f64;
            (avg_gain, avg_loss)
        }
        RsiSmoothing::Wilder => {
            let alpha = 1.0 / period as f64;
            let smooth = |xs: &[f64]| {
                xs.iter()
                    .skip(1)
                    .fold(xs[0], |prev, &x| alpha * x + (1.0 - alpha) * prev)
            };
            (smooth(&gains), smooth(&losses))
        }
    };

    if avg_loss <= 0.0 {
        return None;
    }

    let rs = avg_gain / avg_loss;
    Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}
