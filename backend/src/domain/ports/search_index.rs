//! Port for the full-text search engine.
//!
//! Engines rank entries by token relevance over title, body, and author
//! email, and filter on owner and timestamps. The engine is never
//! authoritative; the synchronizer rebuilds entries from the entity store.

use async_trait::async_trait;

use crate::domain::{QuestionId, SearchHit, SearchIndexEntry, SearchQuery};

use super::define_port_error;

define_port_error! {
    /// Errors raised by search index adapters.
    pub enum SearchIndexError {
        /// The engine could not be reached.
        Unavailable { message: String } =>
            "search index unavailable: {message}",
        /// The engine refused the document or query.
        Rejected { message: String } =>
            "search index rejected request: {message}",
    }
}

impl SearchIndexError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Port for full-text index writes and queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or replace the entry for `entry.question_id`.
    async fn upsert(&self, entry: &SearchIndexEntry) -> Result<(), SearchIndexError>;

    /// Remove the entry for `question_id`. Removing a missing entry succeeds.
    async fn remove(&self, question_id: &QuestionId) -> Result<(), SearchIndexError>;

    /// Execute `query`, returning hits in any order.
    async fn query(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchIndexError>;
}
