//! Notification module
//!
//! Delivers alert and lifecycle messages to the operator chat with a
//! bounded retry. Delivery failure is logged and counted, never propagated
//! into the scan loop.

mod telegram;

pub use telegram::{TelegramConfig, TelegramSink};

use crate::config::NotifyConfig;
use crate::retry::Sleeper;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Sink returned a non-success status
    #[error("notification endpoint returned status {0}")]
    Status(u16),
    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),
    /// Endpoint accepted the request but reported failure
    #[error("message rejected: {0}")]
    Rejected(String),
    /// Bot token or chat id not configured
    #[error("notification credentials are not configured")]
    MissingCredentials,
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => NotifyError::Status(status.as_u16()),
            None => NotifyError::Transport(e.to_string()),
        }
    }
}

/// Trait for message delivery backends
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one message; a single attempt
    async fn deliver(&self, text: &str) -> Result<(), NotifyError>;
}

/// Sends messages through a sink with a fixed-delay retry
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    sleeper: Arc<dyn Sleeper>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Notifier {
    pub fn new(
        sink: Arc<dyn NotificationSink>,
        sleeper: Arc<dyn Sleeper>,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            sink,
            sleeper,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub fn from_config(
        sink: Arc<dyn NotificationSink>,
        sleeper: Arc<dyn Sleeper>,
        config: &NotifyConfig,
    ) -> Self {
        Self::new(
            sink,
            sleeper,
            config.max_attempts,
            Duration::from_secs(config.retry_delay_secs),
        )
    }

    /// Send `text`, retrying up to the attempt cap. Returns true on delivery.
    pub async fn send(&self, text: &str) -> bool {
        for attempt in 1..=self.max_attempts {
            match self.sink.deliver(text).await {
                Ok(()) => return true,
                Err(NotifyError::MissingCredentials) => {
                    tracing::error!("Notification credentials missing, message dropped");
                    return false;
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Notification delivery failed"
                    );
                    if attempt < self.max_attempts {
                        self.sleeper.sleep(self.retry_delay).await;
                    }
                }
            }
        }

        tracing::error!(attempts = self.max_attempts, "Notification dropped after retries");
        false
    }
}
