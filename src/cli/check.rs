//! Check command implementation

use crate::config::Config;
use crate::history::HistoryFetcher;
use crate::indicators::IndicatorSnapshot;
use crate::market::{CoinGeckoClient, CoinGeckoConfig};
use crate::retry::TokioSleeper;
use crate::signal::confirm_cross;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Provider instrument id (e.g. "bitcoin")
    pub id: String,
}

impl CheckArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let provider = Arc::new(CoinGeckoClient::with_config(CoinGeckoConfig::from(
            &config.provider,
        ))?);
        let history = HistoryFetcher::new(provider, Arc::new(TokioSleeper), &config.history);

        let closes = history.fetch_recent_closes(&self.id).await;
        if closes.is_empty() {
            anyhow::bail!(
                "No usable history for {} (need at least {} points)",
                self.id,
                history.min_points()
            );
        }

        let (current, previous) = IndicatorSnapshot::pair(&closes, &config.indicator);
        println!("{}: {} closes, last {:.4}", self.id, closes.len(), closes[closes.len() - 1]);
        println!("  current:  {}", describe(&current));
        println!("  previous: {}", describe(&previous));
        println!(
            "  fresh bullish cross: {}",
            if confirm_cross(&current, &previous) { "yes" } else { "no" }
        );

        Ok(())
    }
}

fn describe(snapshot: &IndicatorSnapshot) -> String {
    let fmt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
    format!(
        "ema={} sma={} rsi={}",
        fmt(snapshot.ema),
        fmt(snapshot.smoothed_sma),
        fmt(snapshot.rsi)
    )
}
