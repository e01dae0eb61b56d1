//! Cardforge - remote image generation driven by asynchronous jobs
//!
//! This library submits generation requests to a remote image-generation
//! job API, polls the job to completion under time and retry bounds, and
//! reconciles the outcome into locally persisted generation records.
//!
//! # High-Level API
//!
//! The [`generation`] module provides the lifecycle controller:
//!
//! ```ignore
//! use cardforge::api::KieJobClient;
//! use cardforge::config::ApiSettings;
//! use cardforge::generation::{ChannelEventSink, GenerationController, GenerationRequest};
//! use cardforge::poller::PollerConfig;
//! use cardforge::store::MemoryRecordStore;
//! use std::sync::Arc;
//!
//! let client = Arc::new(KieJobClient::new(&ApiSettings::default())?);
//! let store = Arc::new(MemoryRecordStore::default());
//! let (sink, mut events) = ChannelEventSink::new();
//!
//! let controller =
//!     GenerationController::new(client, store, PollerConfig::default(), Arc::new(sink));
//! let record_id = controller.submit(GenerationRequest::new("Supermarket", "supermarket")).await?;
//! ```

pub mod api;
pub mod config;
pub mod generation;
pub mod logging;
pub mod poller;
pub mod store;

/// Version of the cardforge library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
