//! Remote generation job API.
//!
//! This module owns everything that crosses the wire: the [`JobClient`]
//! trait, the kie.ai implementation, the response schemas, and the error
//! classification shared by the rest of the crate.

mod client;
mod error;
pub mod schemas;

pub use client::{JobClient, JobStatus, KieJobClient};
pub use error::{ApiError, ErrorKind};
