//! Market data module
//!
//! Instrument snapshots and price history from the market-data provider

mod coingecko;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig, COINGECKO_API_URL};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tradable instrument as reported by the ticker endpoint.
///
/// Immutable snapshot; re-fetched on every universe refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Provider identifier used for history lookups (e.g. "bitcoin")
    pub id: String,
    /// Ticker symbol (e.g. "btc")
    pub symbol: String,
    /// Display name (e.g. "Bitcoin")
    pub name: String,
    /// Last traded price in the quote currency
    pub last_price: Option<Decimal>,
    /// 24h quote volume
    pub volume_24h: Decimal,
}

impl Instrument {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, volume_24h: Decimal) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            symbol: symbol.into(),
            last_price: None,
            volume_24h,
        }
    }

    /// Upper-cased ticker for display
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }
}

/// One OHLC candle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Market-data provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP 429 or equivalent throttling response
    #[error("rate limited by provider")]
    RateLimited,
    /// Any other non-success status
    #[error("provider returned status {0}")]
    Status(u16),
    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),
    /// Payload did not match the expected shape
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            if status.as_u16() == 429 {
                ProviderError::RateLimited
            } else {
                ProviderError::Status(status.as_u16())
            }
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// Trait for market-data provider implementations
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// List all instruments with 24h ticker statistics
    async fn list_instruments(&self) -> Result<Vec<Instrument>, ProviderError>;

    /// Recent candles for one instrument, oldest first
    async fn recent_candles(&self, instrument_id: &str) -> Result<Vec<Candle>, ProviderError>;
}
