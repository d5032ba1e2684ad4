//! Signal module
//!
//! Confirms fresh EMA / smoothed-SMA crossovers and formats the alerts sent
//! for them

mod alert;
mod crossover;

pub use alert::{
    escape_markdown, fatal_message, format_thousands, parse_utc_offset, shutdown_message,
    startup_message, Alert, FATAL_DETAIL_LIMIT,
};
pub use crossover::{confirm_cross, CrossoverSignal};
