//! CoinGecko client and universe provider against a mock HTTP server

mod common;

use common::{market, ohlc_payload, RecordingSleeper};
use cross_scanner::config::UniverseConfig;
use cross_scanner::market::{CoinGeckoClient, CoinGeckoConfig, MarketDataProvider, ProviderError};
use cross_scanner::universe::UniverseProvider;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> CoinGeckoClient {
    CoinGeckoClient::with_config(CoinGeckoConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(2),
        ..CoinGeckoConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_instruments_skips_malformed_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("per_page", "150"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            market("bitcoin", "btc", 31_000_000_000.0),
            {"id": "ghost", "symbol": "gst", "total_volume": null},
            market("ethereum", "eth", 12_000_000_000.0),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let instruments = client(&server).list_instruments().await.unwrap();
    assert_eq!(instruments.len(), 2);
    assert_eq!(instruments[0].id, "bitcoin");
    assert_eq!(instruments[0].volume_24h, dec!(31000000000));
    assert_eq!(instruments[1].symbol, "eth");
}

#[tokio::test]
async fn test_throttling_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/bitcoin/ohlc"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = client(&server).recent_candles("bitcoin").await;
    assert!(matches!(result, Err(ProviderError::RateLimited)));
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client(&server).list_instruments().await;
    assert!(matches!(result, Err(ProviderError::Status(503))));
}

#[tokio::test]
async fn test_recent_candles_ordered_oldest_first() {
    let server = MockServer::start().await;
    let mut payload = ohlc_payload(&[1.0, 2.0, 3.0]);
    if let Some(rows) = payload.as_array_mut() {
        rows.reverse();
    }
    Mock::given(method("GET"))
        .and(path("/coins/solana/ohlc"))
        .and(query_param("days", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let candles = client(&server).recent_candles("solana").await.unwrap();
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    assert_eq!(closes, vec![1.0, 2.0, 3.0]);
}

#[tokio::test]
async fn test_garbage_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/solana/ohlc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client(&server).recent_candles("solana").await;
    assert!(matches!(result, Err(ProviderError::Malformed(_))));
}

#[tokio::test]
async fn test_api_key_header_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .and(header("x-cg-demo-api-key", "CG-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = CoinGeckoClient::with_config(CoinGeckoConfig {
        base_url: server.uri(),
        api_key: Some("CG-test".to_string()),
        ..CoinGeckoConfig::default()
    })
    .unwrap();
    assert!(client.list_instruments().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_universe_retries_once_after_throttling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            market("tether", "usdt", 90_000_000_000.0),
            market("bitcoin", "btc", 31_000_000_000.0),
            market("dust", "dst", 5_000_000.0),
        ])))
        .mount(&server)
        .await;

    let sleeper = Arc::new(RecordingSleeper::default());
    let universe = UniverseProvider::new(
        Arc::new(client(&server)),
        sleeper.clone(),
        &UniverseConfig::default(),
    );

    let instruments = universe.fetch_universe().await;
    let ids: Vec<&str> = instruments.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["bitcoin"]);
    assert_eq!(sleeper.recorded(), vec![Duration::from_secs(30)]);
}

#[tokio::test]
async fn test_universe_unavailable_yields_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let universe = UniverseProvider::new(
        Arc::new(client(&server)),
        Arc::new(RecordingSleeper::default()),
        &UniverseConfig::default(),
    );
    assert!(universe.fetch_universe().await.is_empty());
    assert!(universe.try_fetch_universe().await.is_err());
}
