//! Moving averages
//!
//! EMA with α = 2/(span+1) seeded by the first value (no bias adjustment),
//! rolling SMA, and the two-stage smoothed SMA (EMA with α = 1/window over
//! the SMA series).

/// Exponential smoothing with an arbitrary α, seeded by the first value
fn exponential_smoothing(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut iter = values.iter();
    let Some(&first) = iter.next() else {
        return out;
    };

    let mut prev = first;
    out.push(prev);
    for &value in iter {
        prev = alpha * value + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Full EMA series for `span`
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    exponential_smoothing(values, alpha)
}

/// Last EMA value, absent when fewer than `span` points exist
pub fn ema_last(values: &[f64], span: usize) -> Option<f64> {
    if span == 0 || values.len() < span {
        return None;
    }
    ema(values, span).last().copied()
}

/// Rolling simple moving average; `None` until `window` points are available
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Smoothed SMA: SMA(window) followed by exponential smoothing with
/// α = 1/window, seeded by the first defined SMA value.
///
/// Returns the last value, absent when fewer than `window` points exist.
pub fn smoothed_sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }

    let defined: Vec<f64> = sma(values, window).into_iter().flatten().collect();
    exponential_smoothing(&defined, 1.0 / window as f64)
        .last()
        .copied()
}
