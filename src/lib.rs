//! cross-scanner: rotating watch-list scanner for bullish EMA crossovers
//!
//! This library provides the core components for:
//! - Universe selection from CoinGecko market listings
//! - Rate-limited history acquisition with retry/backoff
//! - EMA, smoothed SMA and RSI indicators
//! - Edge-triggered crossover detection and alert formatting
//! - Telegram notifications with bounded retry
//! - Group rotation with a fixed wall-clock cadence
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod history;
pub mod indicators;
pub mod market;
pub mod notify;
pub mod retry;
pub mod scanner;
pub mod signal;
pub mod telemetry;
pub mod universe;
