//! Entity store: validated, timestamped access to board records.
//!
//! The store sits between the orchestrator and the [`EntityRepository`]
//! port. It owns field validation, referential checks, and timestamps, and
//! translates repository failures into domain errors. It performs no
//! authorization.

use std::sync::Arc;

use mockable::Clock;
use tracing::error;

use super::best_answer::{BestAnswerState, apply_changes};
use super::ports::{EntityRepository, EntityRepositoryError};
use super::validation::{FieldError, ValidationErrors};
use super::{
    Answer, AnswerDraft, AnswerId, Email, Error, Question, QuestionChanges, QuestionDraft,
    QuestionId, User, UserId,
};

/// Validated access to users, questions, and answers.
#[derive(Clone)]
pub struct EntityStore {
    repository: Arc<dyn EntityRepository>,
    clock: Arc<dyn Clock>,
}

impl EntityStore {
    /// Build a store over `repository`, stamping times from `clock`.
    pub fn new(repository: Arc<dyn EntityRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Return the user registered under `email`, creating one if needed.
    pub async fn register_user(&self, email: Email) -> Result<User, Error> {
        if let Some(existing) = self
            .repository
            .find_user_by_email(email.as_ref())
            .await
            .map_err(map_repository_error)?
        {
            return Ok(existing);
        }
        let user = User::new(UserId::random(), email);
        self.repository
            .insert_user(&user)
            .await
            .map_err(map_repository_error)
    }

    /// Look up a user.
    pub async fn find_user(&self, id: &UserId) -> Result<User, Error> {
        self.repository
            .find_user(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    /// Validate `draft` and persist a question authored by `author_id`.
    pub async fn create_question(
        &self,
        author_id: UserId,
        draft: &QuestionDraft,
    ) -> Result<Question, Error> {
        let mut errors = draft
            .validate()
            .err()
            .map(ValidationErrors::into_inner)
            .unwrap_or_default();
        if !self.user_exists(&author_id).await? {
            errors.push(FieldError::unknown_reference("author_id"));
        }
        ValidationErrors::check(errors)?;

        let now = self.clock.utc();
        let question = Question {
            id: QuestionId::random(),
            title: draft.title.clone(),
            body: draft.body.clone(),
            author_id,
            created_at: now,
            updated_at: now,
        };
        self.repository
            .insert_question(&question)
            .await
            .map_err(map_repository_error)?;
        Ok(question)
    }

    /// Apply `changes` to a stored question.
    pub async fn update_question(
        &self,
        question: &Question,
        changes: &QuestionChanges,
    ) -> Result<Question, Error> {
        changes.validate()?;
        let updated = changes.apply_to(question, self.clock.utc());
        self.repository
            .update_question(&updated)
            .await
            .map_err(map_repository_error)?;
        Ok(updated)
    }

    /// Delete a question together with its answers.
    ///
    /// Returns the ids of the answers removed by the cascade.
    pub async fn destroy_question(&self, question: &Question) -> Result<Vec<AnswerId>, Error> {
        self.repository
            .delete_question_cascade(&question.id)
            .await
            .map_err(map_repository_error)
    }

    /// Validate `draft` and persist an answer to `question`.
    pub async fn create_answer(
        &self,
        question: &Question,
        author_id: UserId,
        draft: &AnswerDraft,
    ) -> Result<Answer, Error> {
        let mut errors = draft
            .validate()
            .err()
            .map(ValidationErrors::into_inner)
            .unwrap_or_default();
        if !self.user_exists(&author_id).await? {
            errors.push(FieldError::unknown_reference("author_id"));
        }
        ValidationErrors::check(errors)?;

        let now = self.clock.utc();
        let answer = Answer {
            id: AnswerId::random(),
            question_id: question.id,
            author_id,
            body: draft.body.clone(),
            the_best: false,
            created_at: now,
            updated_at: now,
        };
        self.repository
            .insert_answer(&answer)
            .await
            .map_err(map_repository_error)?;
        Ok(answer)
    }

    /// Replace an answer's body.
    pub async fn update_answer(&self, answer: &Answer, draft: &AnswerDraft) -> Result<Answer, Error> {
        draft.validate()?;
        let updated = Answer {
            body: draft.body.clone(),
            updated_at: self.clock.utc(),
            ..answer.clone()
        };
        self.repository
            .update_answer(&updated)
            .await
            .map_err(map_repository_error)?;
        Ok(updated)
    }

    /// Delete a single answer.
    pub async fn destroy_answer(&self, answer: &Answer) -> Result<(), Error> {
        let removed = self
            .repository
            .delete_answer(&answer.id)
            .await
            .map_err(map_repository_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(format!("answer {} not found", answer.id)))
        }
    }

    /// Look up a question.
    pub async fn find_question(&self, id: &QuestionId) -> Result<Question, Error> {
        self.repository
            .find_question(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("question {id} not found")))
    }

    /// Look up an answer.
    pub async fn find_answer(&self, id: &AnswerId) -> Result<Answer, Error> {
        self.repository
            .find_answer(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("answer {id} not found")))
    }

    /// Every question on the board.
    pub async fn list_questions(&self) -> Result<Vec<Question>, Error> {
        self.repository
            .list_questions()
            .await
            .map_err(map_repository_error)
    }

    /// Answers of `question_id`, oldest first.
    pub async fn answers_of(&self, question_id: &QuestionId) -> Result<Vec<Answer>, Error> {
        self.repository
            .answers_of(question_id)
            .await
            .map_err(map_repository_error)
    }

    /// Make `answer_id` the only best answer of `question_id`.
    ///
    /// Returns the selected answer as stored after the change. Callers must
    /// hold the question's lock so the answers read here are still current
    /// when the flag changes are written.
    pub async fn mark_best(
        &self,
        question_id: &QuestionId,
        answer_id: &AnswerId,
    ) -> Result<Answer, Error> {
        let mut answers = self.answers_of(question_id).await?;
        let transition = BestAnswerState::of(&answers)
            .select(&answers, *answer_id)
            .map_err(|err| Error::not_found(err.to_string()))?;

        if !transition.changes.is_empty() {
            let now = self.clock.utc();
            self.repository
                .apply_best_flags(question_id, &transition.changes, now)
                .await
                .map_err(map_repository_error)?;
            apply_changes(&mut answers, &transition.changes);
            for answer in answers.iter_mut() {
                if transition
                    .changes
                    .iter()
                    .any(|change| change.answer_id == answer.id)
                {
                    answer.updated_at = now;
                }
            }
        }

        answers
            .into_iter()
            .find(|answer| answer.id == *answer_id)
            .ok_or_else(|| Error::not_found(format!("answer {answer_id} not found")))
    }

    async fn user_exists(&self, id: &UserId) -> Result<bool, Error> {
        Ok(self
            .repository
            .find_user(id)
            .await
            .map_err(map_repository_error)?
            .is_some())
    }
}

/// Translate repository failures into domain errors.
pub(crate) fn map_repository_error(error: EntityRepositoryError) -> Error {
    match error {
        EntityRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("entity store unavailable: {message}"))
        }
        EntityRepositoryError::Query { message } => {
            error!(%message, "entity repository query failed");
            Error::internal(format!("entity store error: {message}"))
        }
        EntityRepositoryError::MissingReference { field } => match field.as_str() {
            "author_id" => FieldError::unknown_reference("author_id").into_errors().into(),
            "question_id" => FieldError::unknown_reference("question_id")
                .into_errors()
                .into(),
            other => Error::invalid_request(format!("referenced {other} does not exist")),
        },
        EntityRepositoryError::NotFound { entity, id } => {
            Error::not_found(format!("{entity} {id} not found"))
        }
    }
}
