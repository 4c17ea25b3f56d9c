//! Bounded retry policy for transient transfer conflicts

use std::time::Duration;

use rand::Rng;

use crate::config::LedgerConfig;

/// Retry policy for lock timeouts and serialization conflicts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1)
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, never retry.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn from_config(cfg: &LedgerConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_backoff: Duration::from_millis(cfg.retry_base_backoff_ms),
            max_backoff: Duration::from_millis(cfg.retry_max_backoff_ms),
        }
    }

    /// Whether another attempt may follow attempt number `attempt` (1-indexed).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay after failed attempt number `attempt` (1-indexed).
    ///
    /// Exponential from `base_backoff`, capped at `max_backoff`, with up to
    /// 50% random jitter subtracted so competing retries spread out.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 || self.base_backoff.is_zero() {
            return Duration::ZERO;
        }

        let exp = 2u32.saturating_pow(attempt - 1);
        let full = self
            .base_backoff
            .saturating_mul(exp)
            .min(self.max_backoff);

        let full_ms = full.as_millis() as u64;
        if full_ms < 2 {
            return full;
        }
        let jitter = rand::thread_rng().gen_range(0..=full_ms / 2);
        Duration::from_millis(full_ms - jitter)
    }
}
