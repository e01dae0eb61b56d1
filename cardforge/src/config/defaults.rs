//! Default values for all configuration sections.

/// Default base URL of the generation job API.
pub const DEFAULT_BASE_URL: &str = "https://api.kie.ai/api/v1";

/// Default generation model identifier.
pub const DEFAULT_MODEL: &str = "nano-banana-pro";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default polling interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default overall polling budget in milliseconds (5 minutes).
pub const DEFAULT_POLL_BUDGET_MS: u64 = 300_000;

/// Default bound on consecutive failed status queries.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default maximum number of retained generation records.
pub const DEFAULT_MAX_RECORDS: usize = 100;

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "cardforge.log";
