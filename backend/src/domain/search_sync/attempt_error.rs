//! Failure of one index synchronization attempt.

use std::time::Duration;

use crate::domain::ports::{EntityRepositoryError, SearchIndexError};

/// Why a sync attempt failed. Never surfaced to mutating callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexSyncError {
    /// The search engine failed.
    #[error(transparent)]
    Index(#[from] SearchIndexError),
    /// Reading the authoritative state failed.
    #[error(transparent)]
    Store(#[from] EntityRepositoryError),
    /// The attempt did not finish in time.
    #[error("index sync attempt timed out after {0:?}")]
    TimedOut(Duration),
}

impl IndexSyncError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Index(error) => error.is_retryable(),
            Self::Store(EntityRepositoryError::Connection { .. }) => true,
            Self::Store(_) => false,
            Self::TimedOut(_) => true,
        }
    }
}
