//! Errors surfaced by the generation controller.

use thiserror::Error;

use crate::store::StoreError;

/// Error returned by controller operations.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A generation is already active; finish or cancel it first.
    #[error("a generation is already in progress")]
    AlreadyGenerating,

    /// The record store rejected an operation.
    #[error("record store error: {0}")]
    Store(#[from] StoreError),
}
