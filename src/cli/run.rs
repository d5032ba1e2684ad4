//! Run command implementation

use crate::config::Config;
use crate::market::{CoinGeckoClient, CoinGeckoConfig, MarketDataProvider};
use crate::notify::{NotificationSink, Notifier, TelegramConfig, TelegramSink};
use crate::retry::{Sleeper, TokioSleeper};
use crate::scanner::Scanner;
use crate::signal::{fatal_message, shutdown_message, startup_message};
use clap::Args;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinError;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let provider: Arc<dyn MarketDataProvider> = Arc::new(CoinGeckoClient::with_config(
            CoinGeckoConfig::from(&config.provider),
        )?);
        let telegram = TelegramSink::new(TelegramConfig::from(&config.notify))?;
        if !telegram.is_configured() {
            tracing::warn!("Telegram bot token or chat id missing, alerts will only be logged");
        }
        let sink: Arc<dyn NotificationSink> = Arc::new(telegram);
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
        let notifier = Notifier::from_config(sink.clone(), sleeper.clone(), &config.notify);

        tracing::info!(
            interval_secs = config.scan.interval_secs,
            max_watchlist = config.universe.max_watchlist,
            "Starting cross scanner"
        );
        let mut scanner = Scanner::new(&config, provider, sink, sleeper);
        let once = self.once;
        let scan = async move {
            if once {
                scanner.run_pass().await;
            } else {
                scanner.run().await;
            }
        };
        supervise(&notifier, &startup_message(&config), scan, tokio::signal::ctrl_c()).await
    }
}

/// Announce startup, then drive the scan task until it ends or `shutdown`
/// resolves. The shutdown future is polled from the first await, so an
/// interrupt during a slow startup notice is honoured.
async fn supervise<F, S, T>(
    notifier: &Notifier,
    startup: &str,
    scan: F,
    shutdown: S,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
    S: Future<Output = std::io::Result<T>>,
{
    tokio::pin!(shutdown);

    tokio::select! {
        _ = notifier.send(startup) => {}
        _ = &mut shutdown => {
            tracing::info!("Received shutdown signal during startup");
            notifier.send(&shutdown_message()).await;
            return Ok(());
        }
    }

    let mut task = tokio::spawn(scan);
    tokio::select! {
        result = &mut task => match result {
            Ok(()) => {
                tracing::info!("Scan loop finished");
                Ok(())
            }
            Err(e) => {
                let detail = join_error_detail(e);
                tracing::error!(error = %detail, "Scan loop failed");
                notifier.send(&fatal_message(&detail)).await;
                Err(anyhow::anyhow!("Scan loop failed: {}", detail))
            }
        },
        _ = &mut shutdown => {
            tracing::info!("Received shutdown signal");
            task.abort();
            notifier.send(&shutdown_message()).await;
            Ok(())
        }
    }
}

/// Describe a failed scan task, including the panic payload when present
fn join_error_detail(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "scan task panicked".to_string()
    }
}
