//! Generation lifecycle: requests, records, events, and the controller.
//!
//! The flow is submit-then-reconcile: [`GenerationController::submit`]
//! writes a pending [`GenerationRecord`], creates the remote job, and
//! hands it to a poll session; the session's outcome is folded back into
//! the record and reported through an [`EventSink`].

mod controller;
mod error;
mod events;
mod record;
mod request;

pub use controller::GenerationController;
pub use error::GenerationError;
pub use events::{ChannelEventSink, EventSink, GenerationEvent, NullEventSink};
pub use record::{ErrorInfo, GenerationRecord, RecordId, RecordPatch, RecordStatus};
pub use request::{
    GenerationRequest, DEFAULT_ASPECT_RATIO, DEFAULT_OUTPUT_FORMAT, DEFAULT_RESOLUTION,
};
