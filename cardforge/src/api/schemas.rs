//! Wire format for the remote generation job API.
//!
//! Every response is wrapped in an [`ApiEnvelope`] carrying a business
//! `code` (200 means success, anything else is a failure even under an
//! HTTP 200) and an optional `msg`. These are pure data types with no
//! transport logic.

use serde::{Deserialize, Serialize};

/// Body of the create-job request.
#[derive(Debug, Serialize)]
pub struct CreateTaskRequest<'a> {
    pub model: &'a str,
    pub input: TaskInput<'a>,
}

/// Generation parameters forwarded to the model.
#[derive(Debug, Serialize)]
pub struct TaskInput<'a> {
    pub prompt: &'a str,
    pub aspect_ratio: &'a str,
    pub resolution: &'a str,
    pub output_format: &'a str,
}

/// Response envelope shared by all API endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// Payload of a successful create-job response.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskData {
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// Payload of a job status query.
///
/// `state` is one of `waiting`, `processing`, `success`, `fail`.
/// On success, `resultJson` holds a JSON string with the result URLs;
/// on failure, `failMsg` and `failCode` describe the reason.
#[derive(Debug, Default, Deserialize)]
pub struct RecordInfoData {
    pub state: String,
    #[serde(rename = "resultJson", default)]
    pub result_json: Option<String>,
    #[serde(rename = "failMsg", default)]
    pub fail_msg: Option<String>,
    #[serde(rename = "failCode", default)]
    pub fail_code: Option<String>,
}

/// Inner payload of `resultJson`.
#[derive(Debug, Deserialize)]
pub struct ResultPayload {
    #[serde(rename = "resultUrls", default)]
    pub result_urls: Vec<String>,
}
