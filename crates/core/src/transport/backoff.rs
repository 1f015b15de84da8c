//! Reconnection schedule of the push channel.

use ab_protocol::ReconnectionConfig;
use std::time::Duration;

/// Linear reconnection backoff with a ceiling and an attempt cap.
///
/// Retry `n` (1-based) waits `min(initial * n, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub connect_timeout: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ReconnectionConfig::default())
    }
}

impl From<&ReconnectionConfig> for ReconnectPolicy {
    fn from(config: &ReconnectionConfig) -> Self {
        Self {
            max_attempts: config.attempts,
            initial_delay: Duration::from_millis(config.delay_ms),
            max_delay: Duration::from_millis(config.delay_max_ms),
            connect_timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry `attempt`, or `None` once the cap is exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        Some(self.initial_delay.saturating_mul(attempt).min(self.max_delay))
    }
}
