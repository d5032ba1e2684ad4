//! Telegram Bot API sink

use super::{NotificationSink, NotifyError};
use crate::config::NotifyConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Telegram sink
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// API base URL, without the `/bot<token>` suffix
    pub base_url: String,
    pub bot_token: String,
    pub chat_id: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Deliver silently
    pub disable_notification: bool,
}

impl From<&NotifyConfig> for TelegramConfig {
    fn from(config: &NotifyConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            disable_notification: config.disable_notification,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_notification: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Posts Markdown messages via `sendMessage`
pub struct TelegramSink {
    config: TelegramConfig,
    client: Client,
}

impl TelegramSink {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// True when both the bot token and the chat id are set
    pub fn is_configured(&self) -> bool {
        !self.config.bot_token.is_empty() && !self.config.chat_id.is_empty()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.base_url, self.config.bot_token
        )
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        if !self.is_configured() {
            return Err(NotifyError::MissingCredentials);
        }

        let body = SendMessage {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: "Markdown",
            disable_notification: self.config.disable_notification,
        };

        // The URL embeds the token; keep it out of error messages
        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::from(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Rejected(e.without_url().to_string()))?;
        if !parsed.ok {
            return Err(NotifyError::Rejected(
                parsed
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::debug!(chars = text.chars().count(), "Telegram message delivered");
        Ok(())
    }
}
