//! Remote job polling.
//!
//! A poll session watches one remote job: it queries status on a fixed
//! interval and settles with exactly one [`PollOutcome`]. Sessions can be
//! paused, resumed, and stopped through a [`PollerHandle`]. Pausing stops
//! the queries but not the clock; the session budget always applies.

mod config;
mod core;
mod handle;

pub use config::PollerConfig;
pub use core::{JobPoller, PollOutcome};
pub use handle::{PollSignal, PollerHandle};
