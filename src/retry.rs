//! Retry and backoff policy
//!
//! One policy object shared by every provider call: a pacing delay before
//! each attempt, escalating backoff after rate-limit responses, and a hard
//! cap on attempts. Other failures are returned to the caller immediately.

use crate::market::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Abstraction over sleeping so that timings can be observed in tests
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the Tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// How the backoff grows between rate-limited attempts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escalation {
    /// base * (attempt + 1): 30s, 60s, 90s, ...
    #[default]
    Linear,
    /// base every time
    Fixed,
    /// base * 2^attempt
    Exponential,
}

/// Bounded retry policy for provider calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    escalation: Escalation,
    request_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, escalation: Escalation) -> Self {
        Self {
            max_retries,
            base_delay,
            escalation,
            request_delay: Duration::ZERO,
        }
    }

    /// Set the pacing delay slept before every attempt
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Total attempts, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    /// Backoff to sleep after the rate-limited attempt with index `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        match self.escalation {
            Escalation::Linear => self.base_delay.saturating_mul(attempt + 1),
            Escalation::Fixed => self.base_delay,
            Escalation::Exponential => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        }
    }

    /// Run `op` under this policy.
    ///
    /// `op` receives the zero-based attempt index. Only
    /// [`ProviderError::RateLimited`] is retried; the last error is returned
    /// once attempts are exhausted.
    pub async fn run<T, F, Fut>(
        &self,
        sleeper: &dyn Sleeper,
        label: &str,
        mut op: F,
    ) -> Result<T, ProviderError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            if !self.request_delay.is_zero() {
                sleeper.sleep(self.request_delay).await;
            }

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_rate_limited() && attempt < self.max_retries => {
                    let wait = self.backoff(attempt);
                    tracing::warn!(
                        target_id = label,
                        attempt = attempt + 1,
                        wait_secs = wait.as_secs_f64(),
                        "Rate limited, backing off"
                    );
                    crate::telemetry::record_rate_limit();
                    sleeper.sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(30), Escalation::Linear)
    }
}
