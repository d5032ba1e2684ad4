//! Universe command implementation

use crate::config::Config;
use crate::market::{CoinGeckoClient, CoinGeckoConfig};
use crate::retry::TokioSleeper;
use crate::universe::{partition, UniverseProvider};
use clap::Args;
use rust_decimal_macros::dec;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct UniverseArgs {
    /// Print the watch-list as JSON
    #[arg(long)]
    pub json: bool,
}

impl UniverseArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let provider = Arc::new(CoinGeckoClient::with_config(CoinGeckoConfig::from(
            &config.provider,
        ))?);
        let universe = UniverseProvider::new(provider, Arc::new(TokioSleeper), &config.universe);
        let instruments = universe.try_fetch_universe().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&instruments)?);
            return Ok(());
        }

        let groups = partition(
            instruments,
            config.universe.min_group_size,
            config.universe.num_groups,
        );
        let total: usize = groups.iter().map(|g| g.len()).sum();
        println!("Watch-list: {} instruments in {} groups", total, groups.len());

        let mut rank = 0;
        for group in &groups {
            println!("\nGroup {} ({} instruments)", group.index + 1, group.len());
            for instrument in &group.instruments {
                rank += 1;
                let volume = format!("{:.1}", (instrument.volume_24h / dec!(1000000)).round_dp(1));
                println!(
                    "  {:>3}. {:<10} {:<28} ${:>10}M",
                    rank,
                    instrument.display_symbol(),
                    instrument.id,
                    volume,
                );
            }
        }

        Ok(())
    }
}
