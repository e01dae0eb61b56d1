//! Job client trait and kie.ai implementation.
//!
//! The [`JobClient`] trait abstracts over the remote generation service,
//! allowing the poller and lifecycle controller to work with any backend
//! (and with mocks in tests). The [`KieJobClient`] implementation talks to
//! the kie.ai job API via `reqwest`.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::error::{classify, ApiError, ErrorKind};
use super::schemas::{
    ApiEnvelope, CreateTaskData, CreateTaskRequest, RecordInfoData, ResultPayload, TaskInput,
};
use crate::config::ApiSettings;
use crate::generation::GenerationRequest;

/// Business code for success inside the response envelope.
const BUSINESS_OK: i64 = 200;

/// Remote state of a generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Job accepted, waiting in the remote queue.
    Queued,
    /// Job is being processed.
    Running,
    /// Job finished; the result reference may be absent despite the
    /// success signal, which callers must treat as a failure.
    Succeeded { result_uri: Option<String> },
    /// Job failed with an optional service-provided message, classified
    /// from the body `failCode`.
    Failed {
        message: Option<String>,
        kind: ErrorKind,
    },
}

impl JobStatus {
    /// Returns true when the remote job has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Trait for creating and querying remote generation jobs.
///
/// The request passed to `create_job` must be fully populated; a request
/// with missing required fields is a caller bug, not a recoverable error.
pub trait JobClient: Send + Sync {
    /// Submits a generation job and returns the remote job id.
    ///
    /// Exactly one outbound request is made; failures are never retried
    /// here because job creation is not known to be idempotent.
    fn create_job(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Queries the current status of a job.
    fn get_job_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<JobStatus, ApiError>> + Send;
}

/// Job client for the kie.ai generation API.
///
/// Uses a reusable `reqwest::Client` with connection pooling and a
/// request timeout taken from [`ApiSettings`].
pub struct KieJobClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl KieJobClient {
    /// Creates a new client from API settings.
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }
}

impl JobClient for KieJobClient {
    async fn create_job(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        let body = CreateTaskRequest {
            model: &self.model,
            input: TaskInput {
                prompt: &request.prompt,
                aspect_ratio: &request.aspect_ratio,
                resolution: &request.resolution,
                output_format: &request.output_format,
            },
        };

        let url = format!("{}/jobs/createTask", self.base_url);
        debug!(url = %url, model = %self.model, "Creating generation job");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let msg = serde_json::from_slice::<ApiEnvelope<CreateTaskData>>(&bytes)
                .ok()
                .and_then(|env| env.msg)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ApiError::classified(status.as_u16() as i64, msg, None));
        }

        let envelope: ApiEnvelope<CreateTaskData> = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::network(format!("Invalid response body: {}", e)))?;

        if envelope.code != BUSINESS_OK {
            let msg = envelope
                .msg
                .unwrap_or_else(|| "Job creation rejected".to_string());
            return Err(ApiError::classified(envelope.code, msg, None));
        }

        let data = envelope
            .data
            .ok_or_else(|| ApiError::network("Response missing job data"))?;

        debug!(job_id = %data.task_id, "Generation job created");
        Ok(data.task_id)
    }

    async fn get_job_status(&self, job_id: &str) -> Result<JobStatus, ApiError> {
        let url = format!("{}/jobs/recordInfo?taskId={}", self.base_url, job_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let (msg, fail_code) = match serde_json::from_slice::<ApiEnvelope<RecordInfoData>>(&bytes)
            {
                Ok(env) => (env.msg, env.data.and_then(|d| d.fail_code)),
                Err(_) => (None, None),
            };
            let msg = msg.unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ApiError::classified(
                status.as_u16() as i64,
                msg,
                fail_code.as_deref(),
            ));
        }

        let envelope: ApiEnvelope<RecordInfoData> = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::network(format!("Invalid response body: {}", e)))?;

        if envelope.code != BUSINESS_OK {
            let fail_code = envelope.data.as_ref().and_then(|d| d.fail_code.clone());
            let msg = envelope
                .msg
                .unwrap_or_else(|| "Status query rejected".to_string());
            return Err(ApiError::classified(
                envelope.code,
                msg,
                fail_code.as_deref(),
            ));
        }

        let data = envelope
            .data
            .ok_or_else(|| ApiError::network("Response missing job data"))?;

        Ok(map_record_state(data))
    }
}

/// Maps a status-query payload to a [`JobStatus`].
///
/// An unrecognized `state` is treated as still queued so the poller keeps
/// watching rather than failing on a service-side vocabulary change.
fn map_record_state(data: RecordInfoData) -> JobStatus {
    match data.state.as_str() {
        "waiting" => JobStatus::Queued,
        "processing" => JobStatus::Running,
        "success" => {
            let result_uri = data
                .result_json
                .as_deref()
                .and_then(|raw| serde_json::from_str::<ResultPayload>(raw).ok())
                .and_then(|payload| payload.result_urls.into_iter().next());
            if result_uri.is_none() {
                warn!(result_json = ?data.result_json, "Job succeeded without a result URL");
            }
            JobStatus::Succeeded { result_uri }
        }
        "fail" => JobStatus::Failed {
            message: data.fail_msg,
            kind: classify(BUSINESS_OK, data.fail_code.as_deref()),
        },
        other => {
            warn!(state = %other, "Unknown remote job state, treating as queued");
            JobStatus::Queued
        }
    }
}
