//! Alert and lifecycle message formatting (Telegram Markdown)

use super::CrossoverSignal;
use crate::config::Config;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

/// Maximum characters of a failure description carried in a fatal message
pub const FATAL_DETAIL_LIMIT: usize = 200;

/// A formatted crossover alert. Built per confirmed cross, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub symbol: String,
    pub price: f64,
    pub rsi: Option<f64>,
    pub volume_24h: Decimal,
    pub timestamp: DateTime<Utc>,
    pub timeframe_label: String,
    pub timezone_label: String,
}

impl Alert {
    pub fn from_signal(signal: &CrossoverSignal, timeframe_label: &str, timezone_label: &str) -> Self {
        Self {
            symbol: signal.instrument.display_symbol(),
            price: signal.price,
            rsi: signal.current.rsi,
            volume_24h: signal.instrument.volume_24h,
            timestamp: signal.detected_at,
            timeframe_label: timeframe_label.to_string(),
            timezone_label: timezone_label.to_string(),
        }
    }

    /// Render the message body
    pub fn render(&self) -> String {
        let offset = parse_utc_offset(&self.timezone_label).unwrap_or(Utc.fix());
        let local_time = self.timestamp.with_timezone(&offset);
        let rsi = self
            .rsi
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "n/a".to_string());

        format!(
            "🚨 *{} {} ALERT* ({})\n\
             • Price: ${}\n\
             • RSI: {} 📈\n\
             • Volume: ${:.1}M\n\
             ⏰ {}",
            escape_markdown(&self.symbol),
            escape_markdown(&self.timeframe_label),
            escape_markdown(&self.timezone_label),
            format_thousands(self.price, 2),
            rsi,
            (self.volume_24h / dec!(1000000)).round_dp(1),
            local_time.format("%H:%M:%S"),
        )
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Backslash-escape the entities of Telegram's legacy Markdown
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Parse labels such as "UTC", "UTC+3", "UTC-05:30" or "GMT+2"
pub fn parse_utc_offset(label: &str) -> Option<FixedOffset> {
    let label = label.trim().to_uppercase();
    let rest = label
        .strip_prefix("UTC")
        .or_else(|| label.strip_prefix("GMT"))?;
    if rest.is_empty() {
        return FixedOffset::east_opt(0);
    }

    let mut chars = rest.chars();
    let sign = match chars.next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let body = chars.as_str();
    let (hours, minutes) = match body.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None => (body.parse::<i32>().ok()?, 0),
    };
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Format with a fixed number of decimals and comma thousands separators
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Summary sent once at startup
pub fn startup_message(config: &Config) -> String {
    format!(
        "🤖 *Cross Scanner Activated*\n\
         • Strategy: Rotating groups, EMA{} × smoothed SMA{}\n\
         • Max coins: {}\n\
         • Min Volume: >${}M\n\
         • {} scans every {}s\n\
         • Timezone: {}",
        config.indicator.ema_span,
        config.indicator.sma_window,
        config.universe.max_watchlist,
        (config.universe.min_volume / dec!(1000000)).round_dp(0),
        escape_markdown(&config.scan.timeframe_label),
        config.scan.interval_secs,
        escape_markdown(&config.scan.timezone_label),
    )
}

/// Sent on operator interrupt
pub fn shutdown_message() -> String {
    "🛑 Scanner manually stopped".to_string()
}

/// Sent when a fault escapes the scan loop
pub fn fatal_message(detail: &str) -> String {
    let truncated: String = detail.chars().take(FATAL_DETAIL_LIMIT).collect();
    format!("💢 Critical error: {}", escape_markdown(&truncated))
}
