//! Scan scheduler
//!
//! Owns the rotation and drives one pass per interval: refresh the
//! universe when the rotation has wrapped, scan the current group
//! sequentially, dispatch alerts for confirmed crosses, then sleep for
//! whatever is left of the interval.

mod rotation;

pub use rotation::Rotation;

use crate::config::{Config, IndicatorConfig, ScanConfig};
use crate::history::HistoryFetcher;
use crate::market::{Instrument, MarketDataProvider};
use crate::notify::{NotificationSink, Notifier};
use crate::retry::Sleeper;
use crate::signal::{Alert, CrossoverSignal};
use crate::telemetry;
use crate::universe::{UniverseProvider, WatchGroup};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::Instrument as _;
use uuid::Uuid;

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanState {
    /// Sleeping between passes
    Idle,
    /// Working through a watch-group
    Scanning,
}

/// Outcome of one scan pass
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass_id: Uuid,
    /// Index of the group scanned; `None` when the universe was empty
    pub group_index: Option<usize>,
    pub group_count: usize,
    /// Instruments with a usable history
    pub scanned: usize,
    /// Instruments skipped for missing or short history
    pub skipped: usize,
    pub crossovers: usize,
    pub alerts_sent: usize,
    pub elapsed: Duration,
}

/// Time left in the interval after a pass; never negative
pub fn next_sleep(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

#[derive(Debug, Default)]
struct GroupOutcome {
    scanned: usize,
    skipped: usize,
    crossovers: usize,
    alerts_sent: usize,
}

/// Single-threaded scan loop
pub struct Scanner {
    universe: UniverseProvider,
    history: HistoryFetcher,
    notifier: Notifier,
    sleeper: Arc<dyn Sleeper>,
    indicator: IndicatorConfig,
    scan: ScanConfig,
    rotation: Rotation,
    state: watch::Sender<ScanState>,
}

impl Scanner {
    pub fn new(
        config: &Config,
        provider: Arc<dyn MarketDataProvider>,
        sink: Arc<dyn NotificationSink>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let (state, _) = watch::channel(ScanState::Idle);
        Self {
            universe: UniverseProvider::new(provider.clone(), sleeper.clone(), &config.universe),
            history: HistoryFetcher::new(provider, sleeper.clone(), &config.history),
            notifier: Notifier::from_config(sink, sleeper.clone(), &config.notify),
            sleeper,
            indicator: config.indicator,
            scan: config.scan.clone(),
            rotation: Rotation::new(),
            state,
        }
    }

    /// Current scheduler state
    pub fn state(&self) -> ScanState {
        *self.state.borrow()
    }

    /// Receiver that observes state transitions
    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// Run passes forever, keeping pass starts one interval apart
    pub async fn run(&mut self) {
        loop {
            self.run_cycle().await;
        }
    }

    /// One pass followed by the dynamic sleep
    pub async fn run_cycle(&mut self) -> PassReport {
        let report = self.run_pass().await;
        let wait = next_sleep(self.scan.interval(), report.elapsed);
        let next_group = self.rotation.cursor() + 1;

        tracing::info!(
            wait_secs = %format!("{:.1}", wait.as_secs_f64()),
            next_group,
            "Next scan scheduled"
        );
        self.sleeper.sleep(wait).await;
        report
    }

    /// Scan one watch-group and advance the rotation
    pub async fn run_pass(&mut self) -> PassReport {
        let pass_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "scan_pass",
            %pass_id,
            group = tracing::field::Empty,
            groups = tracing::field::Empty
        );
        self.pass(pass_id, &span).instrument(span.clone()).await
    }

    async fn pass(&mut self, pass_id: Uuid, span: &tracing::Span) -> PassReport {
        let started = Instant::now();
        self.state.send_replace(ScanState::Scanning);

        if self.rotation.needs_refresh() {
            let groups = self.universe.fetch_groups().await;
            let watchlist: usize = groups.iter().map(WatchGroup::len).sum();
            telemetry::set_watchlist_size(watchlist);
            telemetry::set_group_count(groups.len());
            tracing::info!(groups = groups.len(), watchlist, "New scan groups created");
            self.rotation.replace(groups);
        }

        let group_count = self.rotation.group_count();
        let Some(group) = self.rotation.current().cloned() else {
            tracing::warn!("Universe is empty, nothing to scan this pass");
            self.state.send_replace(ScanState::Idle);
            return PassReport {
                pass_id,
                group_index: None,
                group_count,
                scanned: 0,
                skipped: 0,
                crossovers: 0,
                alerts_sent: 0,
                elapsed: started.elapsed(),
            };
        };

        span.record("group", group.index + 1);
        span.record("groups", group_count);
        tracing::info!(instruments = group.len(), "Scanning group");

        let outcome = self.scan_group(&group).await;
        self.rotation.advance();

        let elapsed = started.elapsed();
        telemetry::record_pass(elapsed, outcome.scanned, outcome.crossovers);
        tracing::info!(
            scanned = outcome.scanned,
            skipped = outcome.skipped,
            alerts = outcome.alerts_sent,
            elapsed_secs = %format!("{:.1}", elapsed.as_secs_f64()),
            "Scan pass complete"
        );

        self.state.send_replace(ScanState::Idle);
        PassReport {
            pass_id,
            group_index: Some(group.index),
            group_count,
            scanned: outcome.scanned,
            skipped: outcome.skipped,
            crossovers: outcome.crossovers,
            alerts_sent: outcome.alerts_sent,
            elapsed,
        }
    }

    async fn scan_group(&self, group: &WatchGroup) -> GroupOutcome {
        let mut outcome = GroupOutcome::default();

        for instrument in &group.instruments {
            let closes = self.history.fetch_recent_closes(&instrument.id).await;
            if closes.is_empty() {
                outcome.skipped += 1;
                continue;
            }
            outcome.scanned += 1;

            let Some(signal) = CrossoverSignal::detect(instrument, &closes, &self.indicator) else {
                continue;
            };
            outcome.crossovers += 1;

            if self.dispatch(instrument, &signal).await {
                outcome.alerts_sent += 1;
            }
            self.sleeper.sleep(self.scan.alert_pacing()).await;
        }

        outcome
    }

    async fn dispatch(&self, instrument: &Instrument, signal: &CrossoverSignal) -> bool {
        let alert = Alert::from_signal(
            signal,
            &self.scan.timeframe_label,
            &self.scan.timezone_label,
        );
        tracing::info!(
            symbol = %instrument.display_symbol(),
            price = signal.price,
            rsi = ?signal.current.rsi,
            "Bullish crossover confirmed"
        );

        let delivered = self.notifier.send(&alert.render()).await;
        if delivered {
            telemetry::record_alert_sent();
        } else {
            telemetry::record_alert_dropped();
        }
        delivered
    }
}
