//! Poller configuration.

use std::time::Duration;

use crate::config::{
    PollingSettings, DEFAULT_MAX_RETRIES, DEFAULT_POLL_BUDGET_MS, DEFAULT_POLL_INTERVAL_MS,
};

/// Runtime configuration for a poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Interval between status queries.
    pub interval: Duration,
    /// Overall time budget for the session. The budget keeps running
    /// while the poller is paused.
    pub budget: Duration,
    /// Bound on consecutive failed status queries before giving up.
    pub max_retries: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            budget: Duration::from_millis(DEFAULT_POLL_BUDGET_MS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl From<&PollingSettings> for PollerConfig {
    fn from(settings: &PollingSettings) -> Self {
        Self {
            interval: Duration::from_millis(settings.interval_ms),
            budget: Duration::from_millis(settings.budget_ms),
            max_retries: settings.max_retries,
        }
    }
}
