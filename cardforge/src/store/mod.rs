//! Generation record persistence.
//!
//! The controller talks to storage through the [`RecordStore`] trait so
//! applications can keep records wherever they like. [`MemoryRecordStore`]
//! is the built-in capped in-memory implementation.

mod memory;

pub use memory::MemoryRecordStore;

use std::future::Future;

use thiserror::Error;

use crate::generation::{GenerationRecord, RecordId, RecordPatch};

/// Error returned by record store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record exists with the given id.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The backing storage failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Storage for generation records.
///
/// Implementations must apply `update` atomically with respect to
/// concurrent reads: a reader sees either the whole patch or none of it.
/// `list` returns records newest first.
pub trait RecordStore: Send + Sync {
    /// Inserts a new record, evicting the oldest if the store is full.
    fn create(
        &self,
        record: GenerationRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Looks up a record by id.
    fn get(
        &self,
        id: &RecordId,
    ) -> impl Future<Output = Result<Option<GenerationRecord>, StoreError>> + Send;

    /// Applies a patch to an existing record and returns the updated copy.
    fn update(
        &self,
        id: &RecordId,
        patch: RecordPatch,
    ) -> impl Future<Output = Result<GenerationRecord, StoreError>> + Send;

    /// Removes a record by id.
    fn delete(&self, id: &RecordId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns all records, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<GenerationRecord>, StoreError>> + Send;
}
