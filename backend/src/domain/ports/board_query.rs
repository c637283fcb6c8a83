//! Driving port for browsing and searching the board.

use async_trait::async_trait;

use crate::domain::{
    Actor, Answer, AnswerId, Error, Question, QuestionId, QuestionThread, SearchQuery,
    SearchResults,
};

/// Read-side use-cases. Reads are open to anonymous actors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardQuery: Send + Sync {
    /// Every question on the board.
    async fn list_questions(&self, actor: &Actor) -> Result<Vec<Question>, Error>;

    /// A question with its answers in creation order.
    async fn show_question(
        &self,
        actor: &Actor,
        question_id: &QuestionId,
    ) -> Result<QuestionThread, Error>;

    /// A single answer.
    async fn find_answer(&self, actor: &Actor, answer_id: &AnswerId) -> Result<Answer, Error>;

    /// Run a full-text query against the search index.
    async fn search(&self, actor: &Actor, query: &SearchQuery) -> Result<SearchResults, Error>;
}
