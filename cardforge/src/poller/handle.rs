//! Poller handle for signalling a running poll session.

use std::fmt;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Signal that can be sent to a running poll session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollSignal {
    /// Suspend status queries; the session budget keeps running.
    Pause,
    /// Resume status queries from a paused state.
    Resume,
}

impl fmt::Display for PollSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pause => write!(f, "Pause"),
            Self::Resume => write!(f, "Resume"),
        }
    }
}

/// Handle to a running poll session.
///
/// Cloneable and shareable across tasks; all clones refer to the same
/// session. All methods are non-blocking.
#[derive(Clone)]
pub struct PollerHandle {
    signal_tx: mpsc::Sender<PollSignal>,
    cancel: CancellationToken,
}

impl PollerHandle {
    pub(crate) fn new(signal_tx: mpsc::Sender<PollSignal>, cancel: CancellationToken) -> Self {
        Self { signal_tx, cancel }
    }

    /// Pauses status queries. The session budget keeps running, so a
    /// paused session can still time out.
    pub fn pause(&self) {
        let _ = self.signal_tx.try_send(PollSignal::Pause);
    }

    /// Resumes status queries from a paused state.
    pub fn resume(&self) {
        let _ = self.signal_tx.try_send(PollSignal::Resume);
    }

    /// Stops the session. Idempotent: stopping an already-stopped
    /// session has no effect. Any status query still in flight settles
    /// and its result is discarded.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Returns true once the session has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl fmt::Debug for PollerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollerHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
