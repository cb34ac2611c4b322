use recipe_store::StoreError;
use thiserror::Error;

use crate::builder::ValidationError;

/// Failure of a recipe book intent.
#[derive(Debug, Error)]
pub enum BookError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The blocking task running the storage call panicked or was cancelled.
    #[error("Storage worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Why a draft could not be committed.
#[derive(Debug, Error)]
pub enum CommitError {
    /// Rejected before any storage call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The durable write failed; nothing was applied.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Storage worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<BookError> for CommitError {
    fn from(e: BookError) -> Self {
        match e {
            BookError::Store(e) => CommitError::Store(e),
            BookError::Worker(e) => CommitError::Worker(e),
        }
    }
}
