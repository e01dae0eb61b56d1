//! Poll session driving a single remote job to completion.
//!
//! A [`JobPoller`] queries job status on a fixed interval until the job
//! reaches a terminal state, the session budget runs out, the consecutive
//! failure bound is hit, or the session is stopped. Exactly one
//! [`PollOutcome`] is produced per session.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::PollerConfig;
use super::handle::{PollSignal, PollerHandle};
use crate::api::{ApiError, ErrorKind, JobClient, JobStatus};

/// Capacity of the signal channel; signals are tiny and infrequent.
const SIGNAL_CHANNEL_CAPACITY: usize = 16;

/// Final outcome of a poll session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job finished with a result.
    Succeeded { result_uri: String },
    /// The job failed, or status queries failed too many times in a row.
    Failed { kind: ErrorKind, message: String },
    /// The session budget ran out before the job finished.
    TimedOut,
    /// The session was stopped before the job finished.
    Cancelled,
}

impl PollOutcome {
    fn from_failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            message: message.into(),
        }
    }
}

/// Polls one remote job until it settles.
///
/// Sessions are single-use: construct with [`JobPoller::new`], then consume
/// with [`JobPoller::run`]. The returned [`PollerHandle`] controls the
/// session from outside.
pub struct JobPoller<C: JobClient> {
    client: Arc<C>,
    job_id: String,
    config: PollerConfig,
    signal_rx: mpsc::Receiver<PollSignal>,
    cancel: CancellationToken,
    paused: bool,
    retry_count: u32,
}

impl<C: JobClient> JobPoller<C> {
    /// Creates a poll session for a job along with its control handle.
    pub fn new(
        client: Arc<C>,
        job_id: impl Into<String>,
        config: PollerConfig,
    ) -> (Self, PollerHandle) {
        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let handle = PollerHandle::new(signal_tx, cancel.clone());
        let poller = Self::with_channel(client, job_id, config, signal_rx, cancel);
        (poller, handle)
    }

    /// Creates a session wired to an existing signal channel and token,
    /// for callers that need the handle before the job id is known.
    pub(crate) fn with_channel(
        client: Arc<C>,
        job_id: impl Into<String>,
        config: PollerConfig,
        signal_rx: mpsc::Receiver<PollSignal>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            job_id: job_id.into(),
            config,
            signal_rx,
            cancel,
            paused: false,
            retry_count: 0,
        }
    }

    /// Runs the session to completion.
    ///
    /// The budget is evaluated at every tick, including while paused, so
    /// pausing never extends a session's lifetime. A stop signal wins over
    /// anything else: a status query that settles after the stop is
    /// discarded.
    pub async fn run(mut self) -> PollOutcome {
        info!(
            job_id = %self.job_id,
            interval_ms = self.config.interval.as_millis() as u64,
            budget_ms = self.config.budget.as_millis() as u64,
            "Starting poll session"
        );

        let started = Instant::now();
        // The interval's first tick fires immediately, giving the first
        // status query right at session start.
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // Biased so a stop or a pending signal is always seen before
            // the next tick starts a query.
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(job_id = %self.job_id, "Poll session stopped");
                    return PollOutcome::Cancelled;
                }
                Some(signal) = self.signal_rx.recv() => {
                    self.apply_signal(signal);
                }
                _ = interval.tick() => {
                    if started.elapsed() >= self.config.budget {
                        warn!(job_id = %self.job_id, "Poll session exceeded its budget");
                        return PollOutcome::TimedOut;
                    }
                    if self.paused {
                        continue;
                    }
                    if let Some(outcome) = self.query_once().await {
                        return outcome;
                    }
                }
            }
        }
    }

    fn apply_signal(&mut self, signal: PollSignal) {
        match signal {
            PollSignal::Pause => {
                if !self.paused {
                    info!(job_id = %self.job_id, "Poll session paused");
                    self.paused = true;
                }
            }
            PollSignal::Resume => {
                if self.paused {
                    info!(job_id = %self.job_id, "Poll session resumed");
                    self.paused = false;
                }
            }
        }
    }

    /// Performs one status query. Returns `Some` when the session settles.
    async fn query_once(&mut self) -> Option<PollOutcome> {
        let status = tokio::select! {
            _ = self.cancel.cancelled() => {
                info!(job_id = %self.job_id, "Poll session stopped mid-query");
                return Some(PollOutcome::Cancelled);
            }
            result = self.client.get_job_status(&self.job_id) => result,
        };

        // A stop that raced the query wins; the result is discarded.
        if self.cancel.is_cancelled() {
            info!(job_id = %self.job_id, "Poll session stopped, discarding query result");
            return Some(PollOutcome::Cancelled);
        }

        match status {
            Ok(status) => {
                self.retry_count = 0;
                self.evaluate(status)
            }
            Err(err) => self.record_failure(err),
        }
    }

    fn evaluate(&self, status: JobStatus) -> Option<PollOutcome> {
        match status {
            JobStatus::Queued | JobStatus::Running => {
                debug!(job_id = %self.job_id, status = ?status, "Job still in progress");
                None
            }
            JobStatus::Succeeded {
                result_uri: Some(result_uri),
            } => {
                info!(job_id = %self.job_id, result_uri = %result_uri, "Job succeeded");
                Some(PollOutcome::Succeeded { result_uri })
            }
            JobStatus::Succeeded { result_uri: None } => {
                warn!(job_id = %self.job_id, "Job succeeded without a result");
                Some(PollOutcome::from_failure(
                    ErrorKind::ResultMissing,
                    "Job succeeded but returned no result",
                ))
            }
            JobStatus::Failed { message, kind } => {
                let message = message.unwrap_or_else(|| "Job failed".to_string());
                warn!(job_id = %self.job_id, kind = %kind, message = %message, "Job failed");
                Some(PollOutcome::Failed { kind, message })
            }
        }
    }

    /// Counts a failed status query against the consecutive-failure bound.
    fn record_failure(&mut self, err: ApiError) -> Option<PollOutcome> {
        self.retry_count += 1;
        warn!(
            job_id = %self.job_id,
            attempt = self.retry_count,
            max_retries = self.config.max_retries,
            error = %err,
            "Status query failed"
        );

        if self.retry_count >= self.config.max_retries {
            return Some(PollOutcome::Failed {
                kind: err.kind,
                message: err.user_message(),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationRequest;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Client that returns a scripted sequence of status results, then
    /// repeats the last entry.
    struct ScriptedClient {
        script: Mutex<Vec<Result<JobStatus, ApiError>>>,
        calls: Mutex<u32>,
        delay: Duration,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<JobStatus, ApiError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl JobClient for ScriptedClient {
        async fn create_job(&self, _request: &GenerationRequest) -> Result<String, ApiError> {
            Ok("job-1".to_string())
        }

        async fn get_job_status(&self, _job_id: &str) -> Result<JobStatus, ApiError> {
            *self.calls.lock().unwrap() += 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            }
        }
    }

    fn fast_config() -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(10),
            budget: Duration::from_secs(5),
            max_retries: 3,
        }
    }

    fn succeeded(uri: &str) -> Result<JobStatus, ApiError> {
        Ok(JobStatus::Succeeded {
            result_uri: Some(uri.to_string()),
        })
    }

    #[tokio::test]
    async fn test_poll_until_success() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(JobStatus::Queued),
            Ok(JobStatus::Running),
            succeeded("http://x/img.png"),
        ]));
        let (poller, _handle) = JobPoller::new(Arc::clone(&client), "job-1", fast_config());

        let outcome = poller.run().await;
        assert_eq!(
            outcome,
            PollOutcome::Succeeded {
                result_uri: "http://x/img.png".to_string()
            }
        );
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_poll_job_failure() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(JobStatus::Running),
            Ok(JobStatus::Failed {
                message: Some("content rejected".to_string()),
                kind: ErrorKind::Unknown,
            }),
        ]));
        let (poller, _handle) = JobPoller::new(client, "job-1", fast_config());

        let outcome = poller.run().await;
        assert_eq!(
            outcome,
            PollOutcome::Failed {
                kind: ErrorKind::Unknown,
                message: "content rejected".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_success_without_result_is_failure() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(JobStatus::Succeeded {
            result_uri: None,
        })]));
        let (poller, _handle) = JobPoller::new(client, "job-1", fast_config());

        match poller.run().await {
            PollOutcome::Failed { kind, .. } => assert_eq!(kind, ErrorKind::ResultMissing),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retry_bound_after_consecutive_failures() {
        let client = Arc::new(ScriptedClient::new(vec![Err(ApiError::network(
            "connection refused",
        ))]));
        let (poller, _handle) = JobPoller::new(Arc::clone(&client), "job-1", fast_config());

        let outcome = poller.run().await;
        assert_eq!(client.call_count(), 3);
        match outcome {
            PollOutcome::Failed { kind, .. } => assert_eq!(kind, ErrorKind::Network),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retry_counter_resets_on_success() {
        // Two failures, a success, then two more failures: never three in
        // a row, so the session keeps going until the job settles.
        let client = Arc::new(ScriptedClient::new(vec![
            Err(ApiError::network("flake")),
            Err(ApiError::network("flake")),
            Ok(JobStatus::Running),
            Err(ApiError::network("flake")),
            Err(ApiError::network("flake")),
            succeeded("http://x/img.png"),
        ]));
        let (poller, _handle) = JobPoller::new(Arc::clone(&client), "job-1", fast_config());

        let outcome = poller.run().await;
        assert_eq!(
            outcome,
            PollOutcome::Succeeded {
                result_uri: "http://x/img.png".to_string()
            }
        );
        assert_eq!(client.call_count(), 6);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_times_out() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(JobStatus::Running)]));
        let config = PollerConfig {
            interval: Duration::from_millis(10),
            budget: Duration::from_millis(50),
            max_retries: 3,
        };
        let (poller, _handle) = JobPoller::new(client, "job-1", config);

        assert_eq!(poller.run().await, PollOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_stop_cancels_session() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(JobStatus::Running)]));
        let (poller, handle) = JobPoller::new(client, "job-1", fast_config());

        let task = tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop();

        assert_eq!(task.await.unwrap(), PollOutcome::Cancelled);
        assert!(handle.is_stopped());
    }

    #[tokio::test]
    async fn test_stop_discards_in_flight_result() {
        // The query sleeps long enough for the stop to land while it is in
        // flight; its successful result must not leak out.
        let client = Arc::new(
            ScriptedClient::new(vec![succeeded("http://x/img.png")])
                .with_delay(Duration::from_millis(100)),
        );
        let (poller, handle) = JobPoller::new(client, "job-1", fast_config());

        let task = tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop();

        assert_eq!(task.await.unwrap(), PollOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_pause_suspends_queries() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(JobStatus::Running)]));
        let (poller, handle) = JobPoller::new(Arc::clone(&client), "job-1", fast_config());

        handle.pause();
        let task = tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(client.call_count(), 0);

        handle.resume();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(client.call_count() > 0);

        handle.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_paused_session_still_times_out() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(JobStatus::Running)]));
        let config = PollerConfig {
            interval: Duration::from_millis(10),
            budget: Duration::from_millis(80),
            max_retries: 3,
        };
        let (poller, handle) = JobPoller::new(Arc::clone(&client), "job-1", config);

        handle.pause();
        let outcome = poller.run().await;

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(client.call_count(), 0);
    }
}
