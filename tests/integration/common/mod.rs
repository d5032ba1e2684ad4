//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use cross_scanner::retry::Sleeper;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

/// Sleeper that records requested durations and returns immediately
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// 51 closes whose final point lifts EMA25 above the smoothed SMA50
pub fn crossing_series() -> Vec<f64> {
    let mut closes = vec![100.0; 45];
    closes.extend([99.0; 5]);
    closes.push(103.0);
    closes
}

/// Series with no crossover anywhere
pub fn flat_series(len: usize) -> Vec<f64> {
    vec![100.0; len]
}

/// CoinGecko `/coins/{id}/ohlc` payload for a close series, newest last
pub fn ohlc_payload(closes: &[f64]) -> Value {
    let start_ms: i64 = 1_700_000_000_000;
    let rows: Vec<Value> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| json!([start_ms + i as i64 * 1_800_000, close, close, close, close]))
        .collect();
    Value::Array(rows)
}

/// One record of the CoinGecko `/coins/markets` payload
pub fn market(id: &str, symbol: &str, volume: f64) -> Value {
    json!({
        "id": id,
        "symbol": symbol,
        "name": id,
        "current_price": 1.0,
        "total_volume": volume,
    })
}
