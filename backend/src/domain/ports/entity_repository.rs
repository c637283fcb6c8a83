//! Port for durable board records: users, questions, and answers.
//!
//! Adapters own raw persistence only. Field validation, timestamps, and
//! authorization live in the domain; the repository enforces referential
//! integrity and applies multi-row changes atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::best_answer::BestFlagChange;
use crate::domain::{Answer, AnswerId, Question, QuestionId, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by entity repository adapters.
    pub enum EntityRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "entity repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "entity repository query failed: {message}",
        /// A foreign key points at a missing row.
        MissingReference { field: String } =>
            "referenced {field} does not exist",
        /// The row to update or delete does not exist.
        NotFound { entity: String, id: String } =>
            "{entity} {id} not found",
    }
}

/// Port for board persistence.
///
/// # Atomicity
///
/// [`EntityRepository::delete_question_cascade`] and
/// [`EntityRepository::apply_best_flags`] touch several rows and must be
/// all-or-nothing: no reader may observe an answer that outlives its question
/// or two answers flagged best for the same question.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Persist a new user and return it. When the email is already taken
    /// (ignoring case), nothing is written and the registered user is
    /// returned instead. The check and the write are one atomic step.
    async fn insert_user(&self, user: &User) -> Result<User, EntityRepositoryError>;

    /// Look up a user by id.
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, EntityRepositoryError>;

    /// Look up a user by email, compared case-insensitively.
    async fn find_user_by_email(&self, email: &str)
    -> Result<Option<User>, EntityRepositoryError>;

    /// Persist a new question. The author must exist.
    async fn insert_question(&self, question: &Question) -> Result<(), EntityRepositoryError>;

    /// Replace a stored question.
    async fn update_question(&self, question: &Question) -> Result<(), EntityRepositoryError>;

    /// Delete a question and every answer under it in one step.
    ///
    /// Returns the ids of the removed answers.
    async fn delete_question_cascade(
        &self,
        id: &QuestionId,
    ) -> Result<Vec<AnswerId>, EntityRepositoryError>;

    /// Look up a question by id.
    async fn find_question(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, EntityRepositoryError>;

    /// Every stored question, in no particular order.
    async fn list_questions(&self) -> Result<Vec<Question>, EntityRepositoryError>;

    /// Persist a new answer. The question and author must exist.
    async fn insert_answer(&self, answer: &Answer) -> Result<(), EntityRepositoryError>;

    /// Replace a stored answer.
    async fn update_answer(&self, answer: &Answer) -> Result<(), EntityRepositoryError>;

    /// Delete one answer. Returns `false` when it was already gone.
    async fn delete_answer(&self, id: &AnswerId) -> Result<bool, EntityRepositoryError>;

    /// Look up an answer by id.
    async fn find_answer(&self, id: &AnswerId) -> Result<Option<Answer>, EntityRepositoryError>;

    /// Answers of a question ordered by creation time, then insertion order.
    async fn answers_of(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Answer>, EntityRepositoryError>;

    /// Write a set of best-flag changes for one question atomically,
    /// stamping `updated_at` on every changed answer.
    async fn apply_best_flags(
        &self,
        question_id: &QuestionId,
        changes: &[BestFlagChange],
        updated_at: DateTime<Utc>,
    ) -> Result<(), EntityRepositoryError>;
}

/// Fixture implementation that stores nothing.
///
/// Lookups return empty results and writes succeed. Use it in tests where
/// persistence is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEntityRepository;

#[async_trait]
impl EntityRepository for FixtureEntityRepository {
    async fn insert_user(&self, user: &User) -> Result<User, EntityRepositoryError> {
        Ok(user.clone())
    }

    async fn find_user(&self, _id: &UserId) -> Result<Option<User>, EntityRepositoryError> {
        Ok(None)
    }

    async fn find_user_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<User>, EntityRepositoryError> {
        Ok(None)
    }

    async fn insert_question(&self, _question: &Question) -> Result<(), EntityRepositoryError> {
        Ok(())
    }

    async fn update_question(&self, _question: &Question) -> Result<(), EntityRepositoryError> {
        Ok(())
    }

    async fn delete_question_cascade(
        &self,
        _id: &QuestionId,
    ) -> Result<Vec<AnswerId>, EntityRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_question(
        &self,
        _id: &QuestionId,
    ) -> Result<Option<Question>, EntityRepositoryError> {
        Ok(None)
    }

    async fn list_questions(&self) -> Result<Vec<Question>, EntityRepositoryError> {
        Ok(Vec::new())
    }

    async fn insert_answer(&self, _answer: &Answer) -> Result<(), EntityRepositoryError> {
        Ok(())
    }

    async fn update_answer(&self, _answer: &Answer) -> Result<(), EntityRepositoryError> {
        Ok(())
    }

    async fn delete_answer(&self, _id: &AnswerId) -> Result<bool, EntityRepositoryError> {
        Ok(false)
    }

    async fn find_answer(&self, _id: &AnswerId) -> Result<Option<Answer>, EntityRepositoryError> {
        Ok(None)
    }

    async fn answers_of(
        &self,
        _question_id: &QuestionId,
    ) -> Result<Vec<Answer>, EntityRepositoryError> {
        Ok(Vec::new())
    }

    async fn apply_best_flags(
        &self,
        _question_id: &QuestionId,
        _changes: &[BestFlagChange],
        _updated_at: DateTime<Utc>,
    ) -> Result<(), EntityRepositoryError> {
        Ok(())
    }
}
