//! Configuration for the generation pipeline.
//!
//! Each struct represents one concern (API access, polling behavior,
//! record retention, logging). These are pure data types with documented
//! defaults; nothing here reads ambient state. Components receive their
//! settings explicitly at construction time.

mod defaults;

pub use defaults::{
    DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOG_FILE, DEFAULT_MAX_RECORDS,
    DEFAULT_MAX_RETRIES, DEFAULT_MODEL, DEFAULT_POLL_BUDGET_MS, DEFAULT_POLL_INTERVAL_MS,
};

use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    /// Remote API settings
    pub api: ApiSettings,
    /// Polling settings
    pub polling: PollingSettings,
    /// Record store settings
    pub store: StoreSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL of the job API.
    pub base_url: String,
    /// Bearer token for the job API.
    pub api_key: String,
    /// Model identifier sent with every create-job request.
    pub model: String,
    /// HTTP request timeout in seconds.
    /// Default: 30
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// Polling configuration.
#[derive(Debug, Clone)]
pub struct PollingSettings {
    /// Interval between status queries in milliseconds.
    /// Default: 2000
    pub interval_ms: u64,
    /// Overall time budget for a poll session in milliseconds.
    /// Exceeding it forces a timeout regardless of retry state.
    /// Default: 300000 (5 minutes)
    pub budget_ms: u64,
    /// Bound on consecutive failed status queries before giving up.
    /// Default: 3
    pub max_retries: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            budget_ms: DEFAULT_POLL_BUDGET_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Record store configuration.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Maximum number of retained records; the oldest is evicted on
    /// overflow. Default: 100
    pub max_records: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}
