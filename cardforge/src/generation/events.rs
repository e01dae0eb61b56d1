//! Generation lifecycle events.
//!
//! The controller reports progress through an [`EventSink`] so that callers
//! can drive a UI, a log, or a test harness without the controller knowing
//! which. Sinks must be cheap and non-blocking; the controller emits from
//! its async tasks.

use tokio::sync::mpsc;
use tracing::debug;

use super::record::RecordId;
use crate::api::ErrorKind;

/// Event emitted by the generation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// Human-readable progress update for the active generation.
    Progress(String),
    /// The generation finished with a result; the record is `Completed`.
    Completed(RecordId),
    /// The generation failed, timed out, or a secondary fault occurred.
    Error { kind: ErrorKind, message: String },
}

/// Receives generation events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: GenerationEvent);
}

/// Sink that forwards events over an unbounded channel.
///
/// The usual choice for applications: the receiving side drains events on
/// its own schedule.
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<GenerationEvent>,
}

impl ChannelEventSink {
    /// Creates a sink and the receiver that drains it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<GenerationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: GenerationEvent) {
        // Receiver dropped means nobody is listening; nothing to do.
        if self.tx.send(event).is_err() {
            debug!("event receiver dropped, discarding event");
        }
    }
}

/// Sink that drops every event.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: GenerationEvent) {}
}
