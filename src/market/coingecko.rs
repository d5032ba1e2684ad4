//! CoinGecko REST client
//!
//! Lists coins with 24h market statistics and fetches recent OHLC candles.
//! Raw payloads are validated here; nothing downstream sees a missing field.

use super::{Candle, Instrument, MarketDataProvider, ProviderError};
use crate::config::ProviderConfig;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// CoinGecko public API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Header carrying the optional demo API key
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Configuration for the CoinGecko client
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Quote currency
    pub vs_currency: String,
    /// Page size of the markets listing
    pub per_page: u32,
    /// `days` window of the OHLC endpoint
    pub ohlc_days: String,
    /// Optional demo API key
    pub api_key: Option<String>,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            vs_currency: "usd".to_string(),
            per_page: 150,
            ohlc_days: "2".to_string(),
            api_key: None,
        }
    }
}

impl From<&ProviderConfig> for CoinGeckoConfig {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            vs_currency: config.vs_currency.clone(),
            per_page: config.per_page,
            ohlc_days: config.ohlc_days.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

/// Client for the CoinGecko v3 API
pub struct CoinGeckoClient {
    config: CoinGeckoConfig,
    client: Client,
}

impl CoinGeckoClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_config(CoinGeckoConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: CoinGeckoConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Map throttling and error statuses before decoding the body
    fn check_status(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        Ok(response)
    }

    /// Fetch the markets listing ordered by market cap
    pub async fn fetch_markets(&self) -> Result<Vec<Instrument>, ProviderError> {
        let url = format!("{}/coins/markets", self.config.base_url);
        let per_page = self.config.per_page.to_string();

        tracing::debug!(url = %url, per_page = %per_page, "Fetching markets from CoinGecko");

        let request = self.client.get(&url).query(&[
            ("vs_currency", self.config.vs_currency.as_str()),
            ("order", "market_cap_desc"),
            ("per_page", per_page.as_str()),
            ("page", "1"),
        ]);
        let response = Self::check_status(self.authorized(request).send().await?)?;
        let raw: Vec<serde_json::Value> = response.json().await?;
        let total = raw.len();

        let instruments: Vec<Instrument> = raw
            .into_iter()
            .filter_map(|value| match parse_market(value) {
                Ok(instrument) => Some(instrument),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed market record");
                    None
                }
            })
            .collect();

        tracing::debug!(
            received = total,
            accepted = instruments.len(),
            "Parsed CoinGecko markets"
        );

        Ok(instruments)
    }

    /// Fetch recent OHLC candles for a coin id, oldest first
    pub async fn fetch_ohlc(&self, coin_id: &str) -> Result<Vec<Candle>, ProviderError> {
        let url = format!("{}/coins/{}/ohlc", self.config.base_url, coin_id);

        let request = self.client.get(&url).query(&[
            ("vs_currency", self.config.vs_currency.as_str()),
            ("days", self.config.ohlc_days.as_str()),
        ]);
        let response = Self::check_status(self.authorized(request).send().await?)?;
        let rows: Vec<Vec<f64>> = response.json().await?;

        parse_ohlc_rows(&rows)
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn list_instruments(&self) -> Result<Vec<Instrument>, ProviderError> {
        self.fetch_markets().await
    }

    async fn recent_candles(&self, instrument_id: &str) -> Result<Vec<Candle>, ProviderError> {
        self.fetch_ohlc(instrument_id).await
    }
}

/// Raw record from `/coins/markets`
#[derive(Debug, Deserialize)]
struct GeckoMarket {
    id: Option<String>,
    symbol: Option<String>,
    name: Option<String>,
    current_price: Option<Decimal>,
    total_volume: Option<Decimal>,
}

/// Decode and validate one record of the markets listing
fn parse_market(value: serde_json::Value) -> Result<Instrument, ProviderError> {
    let raw: GeckoMarket =
        serde_json::from_value(value).map_err(|e| ProviderError::Malformed(e.to_string()))?;
    convert_to_instrument(raw)
}

/// Validate a raw market record into an [`Instrument`]
fn convert_to_instrument(raw: GeckoMarket) -> Result<Instrument, ProviderError> {
    let id = raw
        .id
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ProviderError::Malformed("missing id".into()))?;
    let symbol = raw
        .symbol
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ProviderError::Malformed(format!("missing symbol for {id}")))?;
    let volume_24h = raw
        .total_volume
        .ok_or_else(|| ProviderError::Malformed(format!("missing total_volume for {id}")))?;
    if volume_24h.is_sign_negative() {
        return Err(ProviderError::Malformed(format!(
            "negative total_volume for {id}"
        )));
    }

    Ok(Instrument {
        name: raw.name.unwrap_or_else(|| id.clone()),
        id,
        symbol,
        last_price: raw.current_price,
        volume_24h,
    })
}

/// Parse `[timestamp_ms, open, high, low, close]` rows into candles
fn parse_ohlc_rows(rows: &[Vec<f64>]) -> Result<Vec<Candle>, ProviderError> {
    let mut candles = rows
        .iter()
        .map(|row| {
            let [ts, open, high, low, close] = row.as_slice() else {
                return Err(ProviderError::Malformed(format!(
                    "expected 5 values per OHLC row, got {}",
                    row.len()
                )));
            };
            let open_time = Utc
                .timestamp_millis_opt(*ts as i64)
                .single()
                .ok_or_else(|| ProviderError::Malformed(format!("invalid timestamp {ts}")))?;
            Ok(Candle {
                open_time,
                open: *open,
                high: *high,
                low: *low,
                close: *close,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    candles.sort_by_key(|c| c.open_time);
    Ok(candles)
}
