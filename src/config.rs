//! Configuration types for cross-scanner

use crate::indicators::RsiSmoothing;
use crate::retry::{Escalation, RetryPolicy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable that overrides an empty `notify.bot_token`
pub const BOT_TOKEN_ENV: &str = "CROSS_SCANNER_BOT_TOKEN";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub universe: UniverseConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub indicator: IndicatorConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("indicator.sma_window must be at least 2, got {0}")]
    SmaWindowTooSmall(usize),
    #[error("history.min_points ({min_points}) must exceed indicator.sma_window ({sma_window})")]
    WindowNotCovered { min_points: usize, sma_window: usize },
    #[error("{field} must be a finite number of seconds in [0, {max}], got {value}", max = MAX_DELAY_SECS)]
    InvalidSeconds { field: &'static str, value: f64 },
}

/// Upper bound for fractional-second delay settings
pub const MAX_DELAY_SECS: f64 = 86_400.0;

/// Convert a delay setting, clamping values `validate` would reject
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.clamp(0.0, MAX_DELAY_SECS)).unwrap_or(Duration::ZERO)
}

/// Market-data provider (CoinGecko) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    /// Number of tickers requested from the markets endpoint
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// `days` parameter of the OHLC endpoint; controls candle granularity
    #[serde(default = "default_ohlc_days")]
    pub ohlc_days: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
    /// Optional demo API key sent as `x-cg-demo-api-key`
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_provider_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}
fn default_vs_currency() -> String {
    "usd".to_string()
}
fn default_per_page() -> u32 {
    150
}
fn default_ohlc_days() -> String {
    "2".to_string()
}
fn default_provider_timeout() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            vs_currency: default_vs_currency(),
            per_page: default_per_page(),
            ohlc_days: default_ohlc_days(),
            timeout_secs: default_provider_timeout(),
            api_key: None,
        }
    }
}

/// Retry knobs shared by the universe and history fetchers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_universe_retries")]
    pub max_retries: u32,
    /// Base backoff after a rate-limit response (seconds)
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: f64,
    #[serde(default)]
    pub escalation: Escalation,
    /// Delay applied before every attempt (seconds)
    #[serde(default)]
    pub request_delay_secs: f64,
}

fn default_backoff_base() -> f64 {
    30.0
}
fn default_universe_retries() -> u32 {
    1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_universe_retries(),
            backoff_base_secs: default_backoff_base(),
            escalation: Escalation::Linear,
            request_delay_secs: 0.0,
        }
    }
}

impl RetryConfig {
    /// Build the runtime retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            seconds(self.backoff_base_secs),
            self.escalation,
        )
        .with_request_delay(seconds(self.request_delay_secs))
    }
}

/// Universe selection and rotation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Minimum 24h quote volume; entries at or below are dropped
    #[serde(default = "default_min_volume")]
    pub min_volume: Decimal,
    /// Watch-list cap after ranking by volume
    #[serde(default = "default_max_watchlist")]
    pub max_watchlist: usize,
    /// Lower bound on watch-group size
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,
    /// Target number of watch-groups per rotation
    #[serde(default = "default_num_groups")]
    pub num_groups: usize,
    /// Lower-cased symbols, ids or names excluded from the universe
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_min_volume() -> Decimal {
    Decimal::new(100_000_000, 0)
}
fn default_max_watchlist() -> usize {
    50
}
fn default_min_group_size() -> usize {
    10
}
fn default_num_groups() -> usize {
    3
}
fn default_exclusions() -> Vec<String> {
    [
        "usdt",
        "usdc",
        "dai",
        "busd",
        "tusd",
        "usdp",
        "usdd",
        "gusd",
        "lusd",
        "susd",
        "eurt",
        "usdn",
        "mim",
        "fei",
        "alusd",
        "husd",
        "cusd",
        "vust",
        "xaut",
        "vai",
        "binance usd",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            min_volume: default_min_volume(),
            max_watchlist: default_max_watchlist(),
            min_group_size: default_min_group_size(),
            num_groups: default_num_groups(),
            exclusions: default_exclusions(),
            retry: RetryConfig::default(),
        }
    }
}

/// Per-instrument history acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Series shorter than this are rejected before indicator computation.
    /// Must exceed `indicator.sma_window` so the crossover has a previous bar.
    #[serde(default = "default_min_points")]
    pub min_points: usize,
    #[serde(default = "default_history_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: f64,
    #[serde(default)]
    pub escalation: Escalation,
    /// Mandatory pause before every request to respect the per-minute budget
    #[serde(default = "default_request_delay")]
    pub request_delay_secs: f64,
}

fn default_min_points() -> usize {
    51
}
fn default_history_retries() -> u32 {
    3
}
fn default_request_delay() -> f64 {
    6.1
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            min_points: default_min_points(),
            max_retries: default_history_retries(),
            backoff_base_secs: default_backoff_base(),
            escalation: Escalation::Linear,
            request_delay_secs: default_request_delay(),
        }
    }
}

impl HistoryConfig {
    /// Build the runtime retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryConfig {
            max_retries: self.max_retries,
            backoff_base_secs: self.backoff_base_secs,
            escalation: self.escalation,
            request_delay_secs: self.request_delay_secs,
        }
        .policy()
    }
}

/// Indicator parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_ema_span")]
    pub ema_span: usize,
    #[serde(default = "default_sma_window")]
    pub sma_window: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default)]
    pub rsi_smoothing: RsiSmoothing,
}

fn default_ema_span() -> usize {
    25
}
fn default_sma_window() -> usize {
    50
}
fn default_rsi_period() -> usize {
    14
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_span: default_ema_span(),
            sma_window: default_sma_window(),
            rsi_period: default_rsi_period(),
            rsi_smoothing: RsiSmoothing::default(),
        }
    }
}

/// Scan loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Target time between pass starts (seconds)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Pause after each dispatched alert (seconds)
    #[serde(default = "default_alert_pacing")]
    pub alert_pacing_secs: f64,
    /// Candle granularity shown in alerts; CoinGecko serves 30m candles for
    /// `ohlc_days` 1 and 2
    #[serde(default = "default_timeframe_label")]
    pub timeframe_label: String,
    /// Timezone label shown in alerts, e.g. "UTC+3"
    #[serde(default = "default_timezone_label")]
    pub timezone_label: String,
}

fn default_interval() -> u64 {
    900
}
fn default_alert_pacing() -> f64 {
    1.0
}
fn default_timeframe_label() -> String {
    "30m".to_string()
}
fn default_timezone_label() -> String {
    "UTC+3".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            alert_pacing_secs: default_alert_pacing(),
            timeframe_label: default_timeframe_label(),
            timezone_label: default_timezone_label(),
        }
    }
}

impl ScanConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn alert_pacing(&self) -> Duration {
        seconds(self.alert_pacing_secs)
    }
}

/// Notification sink (Telegram) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_telegram_url")]
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "default_notify_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_notify_delay")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub disable_notification: bool,
}

fn default_telegram_url() -> String {
    "https://api.telegram.org".to_string()
}
fn default_notify_attempts() -> u32 {
    3
}
fn default_notify_delay() -> u64 {
    5
}
fn default_notify_timeout() -> u64 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: default_telegram_url(),
            bot_token: String::new(),
            chat_id: String::new(),
            max_attempts: default_notify_attempts(),
            retry_delay_secs: default_notify_delay(),
            timeout_secs: default_notify_timeout(),
            disable_notification: true,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormatConfig,
    /// Prometheus exporter port; no exporter when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Log output format as written in the config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatConfig {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormatConfig::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text, applying the environment override
    /// and validation
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if config.notify.bot_token.is_empty() {
            if let Ok(token) = std::env::var(BOT_TOKEN_ENV) {
                config.notify.bot_token = token;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the scanner cannot operate with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("universe.num_groups", self.universe.num_groups),
            ("universe.min_group_size", self.universe.min_group_size),
            ("universe.max_watchlist", self.universe.max_watchlist),
            ("indicator.ema_span", self.indicator.ema_span),
            ("indicator.rsi_period", self.indicator.rsi_period),
            ("scan.interval_secs", self.scan.interval_secs as usize),
            ("notify.max_attempts", self.notify.max_attempts as usize),
        ];
        if let Some((field, _)) = non_zero.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero { field });
        }
        if self.indicator.sma_window < 2 {
            return Err(ConfigError::SmaWindowTooSmall(self.indicator.sma_window));
        }
        if self.history.min_points <= self.indicator.sma_window {
            return Err(ConfigError::WindowNotCovered {
                min_points: self.history.min_points,
                sma_window: self.indicator.sma_window,
            });
        }
        let delays = [
            ("universe.retry.backoff_base_secs", self.universe.retry.backoff_base_secs),
            ("universe.retry.request_delay_secs", self.universe.retry.request_delay_secs),
            ("history.backoff_base_secs", self.history.backoff_base_secs),
            ("history.request_delay_secs", self.history.request_delay_secs),
            ("scan.alert_pacing_secs", self.scan.alert_pacing_secs),
        ];
        if let Some(&(field, value)) = delays
            .iter()
            .find(|(_, v)| !(0.0..=MAX_DELAY_SECS).contains(v))
        {
            return Err(ConfigError::InvalidSeconds { field, value });
        }
        Ok(())
    }
}
