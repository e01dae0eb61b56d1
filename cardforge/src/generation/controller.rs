//! Generation lifecycle controller.
//!
//! The [`GenerationController`] owns the end-to-end flow of one generation:
//! write a pending record, create the remote job, poll it to completion,
//! and reconcile the record with the outcome. At most one generation is
//! active per controller; callers control it with `cancel`, `pause`, and
//! `resume`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::error::GenerationError;
use super::events::{EventSink, GenerationEvent};
use super::record::{ErrorInfo, GenerationRecord, RecordId, RecordPatch};
use super::request::GenerationRequest;
use crate::api::{ErrorKind, JobClient};
use crate::poller::{JobPoller, PollOutcome, PollSignal, PollerConfig, PollerHandle};
use crate::store::RecordStore;

/// Capacity of the poll signal channel.
const SIGNAL_CHANNEL_CAPACITY: usize = 16;

/// The generation currently being driven, if any.
struct ActiveGeneration {
    record_id: RecordId,
    handle: PollerHandle,
    /// Set by the drive task once the record has been reconciled.
    done: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Drives generations from submission to a reconciled record.
///
/// The controller is the only writer of the records it creates. Poll
/// outcomes are applied to the store as a single patch, and exactly one
/// completion or error event is emitted per generation that settles
/// (cancellation emits neither).
pub struct GenerationController<C, S> {
    client: Arc<C>,
    store: Arc<S>,
    config: PollerConfig,
    events: Arc<dyn EventSink>,
    active: Mutex<Option<ActiveGeneration>>,
}

impl<C, S> GenerationController<C, S>
where
    C: JobClient + 'static,
    S: RecordStore + 'static,
{
    /// Creates a controller over a job client and a record store.
    pub fn new(
        client: Arc<C>,
        store: Arc<S>,
        config: PollerConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            client,
            store,
            config,
            events,
            active: Mutex::new(None),
        }
    }

    /// Submits a generation and returns the id of its record.
    ///
    /// The record is written `Pending` before any network traffic, so a
    /// trace exists even if job creation fails. Creation and polling run
    /// in a background task; failures there end up on the record and in
    /// the event stream, not in this return value.
    pub async fn submit(&self, request: GenerationRequest) -> Result<RecordId, GenerationError> {
        {
            let mut active = self.active.lock().unwrap();
            if let Some(current) = active.as_ref() {
                if !current.done.load(Ordering::Acquire) {
                    return Err(GenerationError::AlreadyGenerating);
                }
                *active = None;
            }
        }

        let record = GenerationRecord::new(request.clone());
        let record_id = record.id.clone();
        self.store.create(record).await?;
        info!(record_id = %record_id, title = %request.title, "Generation submitted");

        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let handle = PollerHandle::new(signal_tx, cancel.clone());
        let done = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(drive(
            Arc::clone(&self.client),
            Arc::clone(&self.store),
            self.config,
            Arc::clone(&self.events),
            record_id.clone(),
            request,
            signal_rx,
            cancel,
            Arc::clone(&done),
        ));

        let mut active = self.active.lock().unwrap();
        *active = Some(ActiveGeneration {
            record_id: record_id.clone(),
            handle,
            done,
            task,
        });

        Ok(record_id)
    }

    /// Cancels the active generation, if any.
    ///
    /// Idempotent and non-blocking. The record moves to `Cancelled` once
    /// the drive task observes the stop; any in-flight result is
    /// discarded and no completion event is emitted.
    pub fn cancel(&self) {
        let active = self.active.lock().unwrap();
        if let Some(current) = active.as_ref() {
            if !current.done.load(Ordering::Acquire) {
                info!(record_id = %current.record_id, "Cancelling generation");
            }
            current.handle.stop();
        }
    }

    /// Pauses status polling for the active generation. No-op when idle.
    pub fn pause(&self) {
        if let Some(current) = self.active.lock().unwrap().as_ref() {
            current.handle.pause();
        }
    }

    /// Resumes status polling for the active generation. No-op when idle.
    pub fn resume(&self) {
        if let Some(current) = self.active.lock().unwrap().as_ref() {
            current.handle.resume();
        }
    }

    /// Returns true while a generation is being driven.
    pub fn is_generating(&self) -> bool {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|current| !current.done.load(Ordering::Acquire))
    }

    /// Id of the active generation's record, if one is being driven.
    pub fn active_record_id(&self) -> Option<RecordId> {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .filter(|current| !current.done.load(Ordering::Acquire))
            .map(|current| current.record_id.clone())
    }

    /// Waits for the active generation's drive task to finish.
    ///
    /// Intended for orderly shutdown and tests; returns immediately when
    /// nothing is active.
    pub async fn join(&self) {
        let task = self.active.lock().unwrap().take();
        if let Some(current) = task {
            let _ = current.task.await;
        }
    }
}

/// Background task carrying one generation from job creation to a
/// reconciled record.
#[allow(clippy::too_many_arguments)]
async fn drive<C, S>(
    client: Arc<C>,
    store: Arc<S>,
    config: PollerConfig,
    events: Arc<dyn EventSink>,
    record_id: RecordId,
    request: GenerationRequest,
    signal_rx: mpsc::Receiver<PollSignal>,
    cancel: CancellationToken,
    done: Arc<AtomicBool>,
) where
    C: JobClient + 'static,
    S: RecordStore + 'static,
{
    events.emit(GenerationEvent::Progress(format!(
        "Creating generation job for \"{}\"",
        request.title
    )));

    let created = tokio::select! {
        _ = cancel.cancelled() => None,
        result = client.create_job(&request) => Some(result),
    };

    // A cancel during or right after job creation wins over the result.
    let created = if cancel.is_cancelled() { None } else { created };

    let job_id = match created {
        None => {
            info!(record_id = %record_id, "Generation cancelled before job creation finished");
            finalize(&store, &events, &record_id, RecordPatch::cancelled(), None).await;
            done.store(true, Ordering::Release);
            return;
        }
        Some(Err(err)) => {
            warn!(record_id = %record_id, error = %err, "Job creation failed");
            let message = err.user_message();
            finalize(
                &store,
                &events,
                &record_id,
                RecordPatch::failed(ErrorInfo::new(err.kind, message.clone())),
                Some(GenerationEvent::Error {
                    kind: err.kind,
                    message,
                }),
            )
            .await;
            done.store(true, Ordering::Release);
            return;
        }
        Some(Ok(job_id)) => job_id,
    };

    // Polling proceeds even if this intermediate write fails; the final
    // reconciliation will surface any persistent store trouble.
    if let Err(err) = store
        .update(&record_id, RecordPatch::polling(job_id.clone()))
        .await
    {
        warn!(record_id = %record_id, error = %err, "Failed to record job id");
    }
    events.emit(GenerationEvent::Progress(
        "Job created, waiting for the image".to_string(),
    ));

    let poller = JobPoller::with_channel(client, job_id, config, signal_rx, cancel);
    let outcome = poller.run().await;

    let (patch, primary) = match outcome {
        PollOutcome::Succeeded { result_uri } => (
            RecordPatch::completed(result_uri),
            Some(GenerationEvent::Completed(record_id.clone())),
        ),
        PollOutcome::Failed { kind, message } => (
            RecordPatch::failed(ErrorInfo::new(kind, message.clone())),
            Some(GenerationEvent::Error { kind, message }),
        ),
        PollOutcome::TimedOut => {
            let message = "Generation timed out, please retry".to_string();
            (
                RecordPatch::failed(ErrorInfo::new(ErrorKind::Timeout, message.clone())),
                Some(GenerationEvent::Error {
                    kind: ErrorKind::Timeout,
                    message,
                }),
            )
        }
        PollOutcome::Cancelled => (RecordPatch::cancelled(), None),
    };

    finalize(&store, &events, &record_id, patch, primary).await;
    done.store(true, Ordering::Release);
}

/// Applies the terminal patch and emits events.
///
/// The primary outcome event is always emitted first; a store failure is
/// reported afterwards as a secondary `Persistence` error so it never
/// masks the generation's own outcome.
async fn finalize<S: RecordStore>(
    store: &Arc<S>,
    events: &Arc<dyn EventSink>,
    record_id: &RecordId,
    patch: RecordPatch,
    primary: Option<GenerationEvent>,
) {
    let persisted = store.update(record_id, patch).await;

    if let Some(event) = primary {
        events.emit(event);
    }

    if let Err(err) = persisted {
        warn!(record_id = %record_id, error = %err, "Failed to persist generation outcome");
        events.emit(GenerationEvent::Error {
            kind: ErrorKind::Persistence,
            message: format!("Failed to save the generation record: {}", err),
        });
    }
}
