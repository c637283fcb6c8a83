//! Port through which mutations queue search index work.
//!
//! Enqueueing never fails and never blocks on the index. The consumer keys
//! work per question id and reconciles from the entity store when it runs.

use crate::domain::QuestionId;

/// Index work requested for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexOperation {
    /// Project the question's current stored state into the index.
    Upsert,
    /// Drop the question's entry.
    Remove,
}

/// Outbox consumed by the search index synchronizer.
#[cfg_attr(test, mockall::automock)]
pub trait SearchIndexOutbox: Send + Sync {
    /// Queue `operation` for `question_id`, replacing any pending job for it.
    fn enqueue(&self, question_id: QuestionId, operation: IndexOperation);
}

/// Outbox that discards every job.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSearchIndexOutbox;

impl SearchIndexOutbox for FixtureSearchIndexOutbox {
    fn enqueue(&self, _question_id: QuestionId, _operation: IndexOperation) {}
}
