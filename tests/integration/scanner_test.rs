//! Scanner behaviour against in-memory provider and sink

mod common;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use common::{crossing_series, flat_series, RecordingSleeper};
use cross_scanner::config::Config;
use cross_scanner::market::{Candle, Instrument, MarketDataProvider, ProviderError};
use cross_scanner::notify::{NotificationSink, NotifyError};
use cross_scanner::scanner::{ScanState, Scanner};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct StubProvider {
    instruments: Vec<Instrument>,
    series: HashMap<String, Vec<f64>>,
    requested: Mutex<Vec<String>>,
}

impl StubProvider {
    /// 45 tradable coins, 5 stablecoins and 10 coins below the volume floor
    fn mixed_universe(crossing: &[&str]) -> Self {
        let mut instruments = Vec::new();
        for i in 0..45u64 {
            instruments.push(Instrument::new(
                format!("coin-{i}"),
                format!("c{i}"),
                Decimal::from(200_000_000 + i * 1_000_000),
            ));
        }
        for symbol in ["usdt", "usdc", "dai", "busd", "tusd"] {
            instruments.push(Instrument::new(
                format!("{symbol}-stable"),
                symbol,
                Decimal::from(50_000_000_000u64),
            ));
        }
        for i in 0..10u64 {
            instruments.push(Instrument::new(
                format!("small-{i}"),
                format!("s{i}"),
                Decimal::from(1_000_000 * (i + 1)),
            ));
        }

        let series = instruments
            .iter()
            .map(|inst| {
                let closes = if crossing.contains(&inst.id.as_str()) {
                    crossing_series()
                } else {
                    flat_series(60)
                };
                (inst.id.clone(), closes)
            })
            .collect();

        Self {
            instruments,
            series,
            requested: Mutex::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn list_instruments(&self) -> Result<Vec<Instrument>, ProviderError> {
        Ok(self.instruments.clone())
    }

    async fn recent_candles(&self, id: &str) -> Result<Vec<Candle>, ProviderError> {
        self.requested.lock().unwrap().push(id.to_string());
        let closes = self.series.get(id).ok_or(ProviderError::Status(404))?;
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Ok(closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                open_time: start + chrono::Duration::minutes(30 * i as i64),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect())
    }
}

#[derive(Default)]
struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl NotificationSink for CollectingSink {
    async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.history.request_delay_secs = 0.0;
    config
}

#[tokio::test]
async fn test_full_rotation_scans_filtered_universe_once() {
    let provider = Arc::new(StubProvider::mixed_universe(&[]));
    let sink = Arc::new(CollectingSink::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut scanner = Scanner::new(&config(), provider.clone(), sink, sleeper);

    let mut groups = Vec::new();
    for _ in 0..3 {
        let report = scanner.run_pass().await;
        assert_eq!(report.group_count, 3);
        assert_eq!(report.scanned, 15);
        groups.push(report.group_index);
    }
    assert_eq!(groups, vec![Some(0), Some(1), Some(2)]);

    let requested = provider.requested();
    assert_eq!(requested.len(), 45);
    let unique: HashSet<&String> = requested.iter().collect();
    assert_eq!(unique.len(), 45);
    assert!(requested.iter().all(|id| id.starts_with("coin-")));
    // Highest volume is scanned first
    assert_eq!(requested[0], "coin-44");
}

#[tokio::test]
async fn test_alert_dispatched_once_per_cross() {
    let provider = Arc::new(StubProvider::mixed_universe(&["coin-40"]));
    let sink = Arc::new(CollectingSink::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut scanner = Scanner::new(&config(), provider, sink.clone(), sleeper.clone());

    let report = scanner.run_pass().await;
    assert_eq!(report.crossovers, 1);
    assert_eq!(report.alerts_sent, 1);
    assert_eq!(scanner.state(), ScanState::Idle);

    let messages = sink.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("*C40 30m ALERT* (UTC+3)"));
    assert_eq!(sleeper.recorded(), vec![Duration::from_secs(1)]);
}

#[tokio::test]
async fn test_state_returns_to_idle_between_passes() {
    let provider = Arc::new(StubProvider::mixed_universe(&[]));
    let sink = Arc::new(CollectingSink::default());
    let sleeper = Arc::new(RecordingSleeper::default());
    let mut scanner = Scanner::new(&config(), provider, sink, sleeper.clone());
    let mut states = scanner.subscribe();

    assert_eq!(*states.borrow_and_update(), ScanState::Idle);
    scanner.run_cycle().await;
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), ScanState::Idle);

    let recorded = sleeper.recorded();
    assert_eq!(recorded.len(), 1);
    assert!(recorded[0] <= Duration::from_secs(900));
}
