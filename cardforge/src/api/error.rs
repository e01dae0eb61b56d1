//! Error types and classification for the remote job API.
//!
//! The remote service reports failures through three layers: HTTP status
//! codes, a business code wrapped in a 200 response, and a machine-readable
//! `failCode` string in the response body. [`ApiError::classified`] folds all
//! three into a single [`ErrorKind`], with the numeric code taking precedence
//! and the body `failCode` used as a fallback when the code is ambiguous.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a generation failure.
///
/// The first six variants come from the remote API layer; `Timeout`,
/// `ResultMissing`, and `Persistence` are produced locally by the poller
/// and the lifecycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Invalid or missing credentials, or a permission failure.
    Auth,
    /// Account balance or quota exhausted.
    Quota,
    /// Request throttled by the remote service.
    RateLimit,
    /// Server-side failure (5xx or internal error signals).
    Server,
    /// Transport-level failure, no usable response.
    Network,
    /// The polling budget was exceeded before the job finished.
    Timeout,
    /// The job reported success but carried no result reference.
    ResultMissing,
    /// The final record could not be written to the store.
    Persistence,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Returns true for kinds that are worth retrying during polling.
    ///
    /// Only transient transport and server conditions qualify; auth and
    /// quota failures will not fix themselves on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::Server | Self::RateLimit)
    }

    /// User-facing message for this classification.
    ///
    /// `Unknown` has no canned message; callers should fall back to the
    /// raw error message (see [`ApiError::user_message`]).
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Auth => Some("API key is invalid or unauthorized, check your configuration"),
            Self::Quota => Some("API quota exhausted, top up your account and retry"),
            Self::RateLimit => Some("Too many requests, please retry later"),
            Self::Server => Some("Server error, please retry later"),
            Self::Network => Some("Network error, check your connection"),
            Self::Timeout => Some("Generation timed out, please retry"),
            Self::ResultMissing => Some("Generation succeeded but returned no image"),
            Self::Persistence => Some("Failed to save the generation record"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "AUTH"),
            Self::Quota => write!(f, "QUOTA"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Server => write!(f, "SERVER"),
            Self::Network => write!(f, "NETWORK"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::ResultMissing => write!(f, "RESULT_MISSING"),
            Self::Persistence => write!(f, "PERSISTENCE"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Error raised by the [`JobClient`](super::JobClient) operations.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind}: {message}")]
pub struct ApiError {
    /// Raw error message from the service or transport layer.
    pub message: String,
    /// HTTP status or business code, when a response was received.
    pub code: Option<i64>,
    /// Classification of the failure.
    pub kind: ErrorKind,
}

impl ApiError {
    /// Transport-level failure with no usable response.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            kind: ErrorKind::Network,
        }
    }

    /// Builds an error from a response code and optional body `failCode`.
    pub fn classified(code: i64, message: impl Into<String>, fail_code: Option<&str>) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
            kind: classify(code, fail_code),
        }
    }

    /// User-facing message for this error.
    ///
    /// Known classifications map to a fixed message; `Unknown` falls back
    /// to the raw message when one is present.
    pub fn user_message(&self) -> String {
        match self.kind.user_message() {
            Some(msg) => msg.to_string(),
            None if !self.message.is_empty() => self.message.clone(),
            None => "Unknown error, please retry".to_string(),
        }
    }
}

/// Classifies a failure from its numeric code and optional body `failCode`.
///
/// The numeric code (HTTP status or business code) is checked first; the
/// `failCode` keywords are a fallback for ambiguous codes, e.g. a business
/// failure wrapped in a 200 response.
pub(crate) fn classify(code: i64, fail_code: Option<&str>) -> ErrorKind {
    match code {
        401 | 403 => return ErrorKind::Auth,
        402 => return ErrorKind::Quota,
        429 => return ErrorKind::RateLimit,
        c if c >= 500 => return ErrorKind::Server,
        _ => {}
    }

    if let Some(fail_code) = fail_code {
        let fail_code = fail_code.to_ascii_lowercase();
        if fail_code.contains("auth") || fail_code.contains("token") {
            return ErrorKind::Auth;
        }
        if fail_code.contains("quota") || fail_code.contains("balance") {
            return ErrorKind::Quota;
        }
        if fail_code.contains("rate") || fail_code.contains("limit") {
            return ErrorKind::RateLimit;
        }
        if fail_code.contains("server") || fail_code.contains("internal") {
            return ErrorKind::Server;
        }
    }

    ErrorKind::Unknown
}
