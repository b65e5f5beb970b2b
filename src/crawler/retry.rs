//! Retry schedule for file downloads

use crate::config::RetryConfig;
use std::time::Duration;

/// Exponential backoff policy
///
/// After failed attempt `n` (0-based) the downloader waits
/// `base_delay * 2^n` before trying again, until `max_attempts` attempts
/// have been made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Delay before retrying after failed attempt `attempt` (0-based), or
    /// `None` when no attempts remain.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt.saturating_add(1) >= self.max_attempts {
            return None;
        }
        let factor = 1u32 << attempt.min(16);
        Some(self.base_delay.saturating_mul(factor))
    }
}
