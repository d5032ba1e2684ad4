//! End-to-end integration tests: CoinGecko and Telegram mocks wired
//! through the real clients and the scanner

mod common;

use common::{crossing_series, flat_series, market, ohlc_payload, RecordingSleeper};
use cross_scanner::config::Config;
use cross_scanner::market::{CoinGeckoClient, CoinGeckoConfig};
use cross_scanner::notify::{TelegramConfig, TelegramSink};
use cross_scanner::scanner::Scanner;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_ohlc(server: &MockServer, id: &str, closes: &[f64]) {
    Mock::given(method("GET"))
        .and(path(format!("/coins/{id}/ohlc")))
        .respond_with(ResponseTemplate::new(200).set_body_json(ohlc_payload(closes)))
        .mount(server)
        .await;
}

#[test]
fn test_config_example_loads() {
    let config = Config::parse(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.scan.interval_secs, 900);
    assert_eq!(config.universe.max_watchlist, 50);
    assert!(config.notify.chat_id.is_empty());
}

#[tokio::test]
async fn test_crossover_produces_single_telegram_alert() {
    let coingecko = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            market("tether", "usdt", 80_000_000_000.0),
            market("bitcoin", "btc", 31_000_000_000.0),
            market("ethereum", "eth", 12_000_000_000.0),
            market("tiny", "tny", 2_000_000.0),
        ])))
        .expect(1)
        .mount(&coingecko)
        .await;
    mock_ohlc(&coingecko, "bitcoin", &crossing_series()).await;
    mock_ohlc(&coingecko, "ethereum", &flat_series(96)).await;

    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&telegram)
        .await;

    let mut config = Config::default();
    config.provider.base_url = coingecko.uri();
    config.history.request_delay_secs = 0.0;
    config.notify.base_url = telegram.uri();
    config.notify.bot_token = "123:abc".to_string();
    config.notify.chat_id = "42".to_string();

    let provider = Arc::new(CoinGeckoClient::with_config(CoinGeckoConfig::from(&config.provider)).unwrap());
    let sink = Arc::new(TelegramSink::new(TelegramConfig::from(&config.notify)).unwrap());
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut scanner = Scanner::new(&config, provider, sink, sleeper);

    let report = scanner.run_pass().await;
    assert_eq!(report.group_count, 1);
    assert_eq!(report.scanned, 2);
    assert_eq!(report.crossovers, 1);
    assert_eq!(report.alerts_sent, 1);

    let requests = telegram.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("🚨 *BTC 30m ALERT* (UTC+3)"));
    assert!(text.contains("• Price: $103.00"));
    assert!(text.contains("• RSI: 80.0"));
    assert!(text.contains("• Volume: $31000.0M"));
    assert_eq!(body["chat_id"], "42");
    assert_eq!(body["parse_mode"], "Markdown");
}

#[tokio::test]
async fn test_throttled_history_skips_instrument_without_alert() {
    let coingecko = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coins/markets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([market("bitcoin", "btc", 31_000_000_000.0)])),
        )
        .mount(&coingecko)
        .await;
    Mock::given(method("GET"))
        .and(path("/coins/bitcoin/ohlc"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&coingecko)
        .await;

    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(0)
        .mount(&telegram)
        .await;

    let mut config = Config::default();
    config.provider.base_url = coingecko.uri();
    config.history.request_delay_secs = 0.0;
    config.notify.base_url = telegram.uri();
    config.notify.bot_token = "123:abc".to_string();
    config.notify.chat_id = "42".to_string();

    let provider = Arc::new(CoinGeckoClient::with_config(CoinGeckoConfig::from(&config.provider)).unwrap());
    let sink = Arc::new(TelegramSink::new(TelegramConfig::from(&config.notify)).unwrap());
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut scanner = Scanner::new(&config, provider, sink, sleeper.clone());

    let report = scanner.run_pass().await;
    assert_eq!(report.scanned, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        sleeper.recorded(),
        vec![
            std::time::Duration::from_secs(30),
            std::time::Duration::from_secs(60),
            std::time::Duration::from_secs(90),
        ]
    );
}
