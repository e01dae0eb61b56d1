//! Generation records and their lifecycle.
//!
//! A [`GenerationRecord`] is the durable trace of one submission. It is
//! created `Pending`, moves to `Polling` once the remote job id is known,
//! and ends in exactly one of `Completed`, `Failed`, or `Cancelled`.
//! Only the lifecycle controller that created a record transitions it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::GenerationRequest;
use crate::api::ErrorKind;

/// Global counter disambiguating ids minted within the same millisecond.
static RECORD_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a generation record.
///
/// Ids are client-generated at submission time, before the remote service
/// has assigned a job id.
#[derive(Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record id with the given string value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a unique auto-generated record id.
    ///
    /// The format is `card-{millis}-{counter}`.
    pub fn auto() -> Self {
        let millis = Utc::now().timestamp_millis();
        let counter = RECORD_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("card-{}-{}", millis, counter))
    }

    /// Returns the string value of this id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a generation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Created locally, remote job not yet confirmed.
    Pending,
    /// Remote job created, poller watching it.
    Polling,
    /// Finished with a result.
    Completed,
    /// Finished with an error.
    Failed,
    /// Cancelled by the caller.
    Cancelled,
}

impl RecordStatus {
    /// Returns true for final states.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Polling => write!(f, "polling"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Classified error stored on a failed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Durable record of one generation.
///
/// Invariants:
/// - `job_id` is set before the record leaves `Pending`;
/// - exactly one of `result_uri`/`error` is set when the status is
///   `Completed`/`Failed`, both are `None` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: RecordId,
    /// Remote job id, assigned once creation succeeds.
    pub job_id: Option<String>,
    pub request: GenerationRequest,
    pub status: RecordStatus,
    /// Result reference, set only on `Completed`.
    pub result_uri: Option<String>,
    /// Failure details, set only on `Failed`.
    pub error: Option<ErrorInfo>,
    pub created_at: DateTime<Utc>,
    pub terminated_at: Option<DateTime<Utc>>,
}

impl GenerationRecord {
    /// Creates a fresh pending record for a request.
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            id: RecordId::auto(),
            job_id: None,
            request,
            status: RecordStatus::Pending,
            result_uri: None,
            error: None,
            created_at: Utc::now(),
            terminated_at: None,
        }
    }
}

/// Partial update applied to a record as a single atomic write.
///
/// `None` fields are left untouched. Use the constructors to get patches
/// that respect the record invariants.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub job_id: Option<String>,
    pub status: Option<RecordStatus>,
    pub result_uri: Option<String>,
    pub error: Option<ErrorInfo>,
    pub terminated_at: Option<DateTime<Utc>>,
}

impl RecordPatch {
    /// Transition to `Polling` with the freshly assigned job id.
    pub fn polling(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            status: Some(RecordStatus::Polling),
            ..Self::default()
        }
    }

    /// Terminal transition to `Completed` with the result reference.
    pub fn completed(result_uri: impl Into<String>) -> Self {
        Self {
            status: Some(RecordStatus::Completed),
            result_uri: Some(result_uri.into()),
            terminated_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Terminal transition to `Failed` with the classified error.
    pub fn failed(error: ErrorInfo) -> Self {
        Self {
            status: Some(RecordStatus::Failed),
            error: Some(error),
            terminated_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Terminal transition to `Cancelled`.
    pub fn cancelled() -> Self {
        Self {
            status: Some(RecordStatus::Cancelled),
            terminated_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Applies this patch to a record in place.
    pub fn apply(&self, record: &mut GenerationRecord) {
        if let Some(job_id) = &self.job_id {
            record.job_id = Some(job_id.clone());
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(result_uri) = &self.result_uri {
            record.result_uri = Some(result_uri.clone());
        }
        if let Some(error) = &self.error {
            record.error = Some(error.clone());
        }
        if let Some(terminated_at) = self.terminated_at {
            record.terminated_at = Some(terminated_at);
        }
    }
}
