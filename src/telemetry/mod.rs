//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{
    record_alert_dropped, record_alert_sent, record_history_failure, record_pass,
    record_rate_limit, set_group_count, set_watchlist_size, HistoryFailure,
};

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Guard held for the lifetime of the process
pub struct TelemetryGuard {
    /// Address the Prometheus exporter listens on, if started
    pub metrics_addr: Option<SocketAddr>,
}

/// Initialize all telemetry subsystems.
///
/// Must be called from within a Tokio runtime when a metrics port is set.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format.into())?;

    let metrics_addr = match config.metrics_port {
        Some(port) => {
            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
            PrometheusBuilder::new()
                .with_http_listener(addr)
                .install()
                .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
            tracing::info!(%addr, "Prometheus exporter listening");
            Some(addr)
        }
        None => None,
    };

    Ok(TelemetryGuard { metrics_addr })
}
