//! In-memory implementation of the entity repository port.
//!
//! All tables sit behind one `RwLock`, so multi-row operations (cascade
//! delete, best-flag updates) are atomic with respect to every reader.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::best_answer::BestFlagChange;
use crate::domain::ports::{EntityRepository, EntityRepositoryError};
use crate::domain::{Answer, AnswerId, Question, QuestionId, User, UserId};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    questions: HashMap<QuestionId, Question>,
    // Insertion order breaks ties between equal `created_at` values.
    answers: Vec<Answer>,
}

impl Tables {
    fn answer_position(&self, id: &AnswerId) -> Option<usize> {
        self.answers.iter().position(|answer| answer.id == *id)
    }
}

/// Entity repository holding every record in process memory.
///
/// # Examples
/// ```
/// use backend::domain::ports::EntityRepository;
/// use backend::outbound::persistence::InMemoryEntityRepository;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = InMemoryEntityRepository::default();
/// assert!(repo.list_questions().await.expect("list").is_empty());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEntityRepository {
    tables: RwLock<Tables>,
}

impl InMemoryEntityRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(entity: &str, id: impl ToString) -> EntityRepositoryError {
    EntityRepositoryError::not_found(entity, id.to_string())
}

#[async_trait]
impl EntityRepository for InMemoryEntityRepository {
    async fn insert_user(&self, user: &User) -> Result<User, EntityRepositoryError> {
        let mut tables = self.tables.write().await;
        let registered = tables
            .users
            .values()
            .find(|existing| existing.email.as_ref().eq_ignore_ascii_case(user.email.as_ref()))
            .cloned();
        if let Some(existing) = registered {
            return Ok(existing);
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, EntityRepositoryError> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<User>, EntityRepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.email.as_ref().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_question(&self, question: &Question) -> Result<(), EntityRepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&question.author_id) {
            return Err(EntityRepositoryError::missing_reference("author_id"));
        }
        tables.questions.insert(question.id, question.clone());
        Ok(())
    }

    async fn update_question(&self, question: &Question) -> Result<(), EntityRepositoryError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .questions
            .get_mut(&question.id)
            .ok_or_else(|| not_found("question", question.id))?;
        *stored = question.clone();
        Ok(())
    }

    async fn delete_question_cascade(
        &self,
        id: &QuestionId,
    ) -> Result<Vec<AnswerId>, EntityRepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.questions.contains_key(id) {
            return Err(not_found("question", id));
        }
        let removed = tables
            .answers
            .iter()
            .filter(|answer| answer.question_id == *id)
            .map(|answer| answer.id)
            .collect::<Vec<_>>();
        tables.answers.retain(|answer| answer.question_id != *id);
        tables.questions.remove(id);
        Ok(removed)
    }

    async fn find_question(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, EntityRepositoryError> {
        Ok(self.tables.read().await.questions.get(id).cloned())
    }

    async fn list_questions(&self) -> Result<Vec<Question>, EntityRepositoryError> {
        Ok(self.tables.read().await.questions.values().cloned().collect())
    }

    async fn insert_answer(&self, answer: &Answer) -> Result<(), EntityRepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.questions.contains_key(&answer.question_id) {
            return Err(EntityRepositoryError::missing_reference("question_id"));
        }
        if !tables.users.contains_key(&answer.author_id) {
            return Err(EntityRepositoryError::missing_reference("author_id"));
        }
        tables.answers.push(answer.clone());
        Ok(())
    }

    async fn update_answer(&self, answer: &Answer) -> Result<(), EntityRepositoryError> {
        let mut tables = self.tables.write().await;
        let position = tables
            .answer_position(&answer.id)
            .ok_or_else(|| not_found("answer", answer.id))?;
        tables.answers[position] = answer.clone();
        Ok(())
    }

    async fn delete_answer(&self, id: &AnswerId) -> Result<bool, EntityRepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(match tables.answer_position(id) {
            Some(position) => {
                tables.answers.remove(position);
                true
            }
            None => false,
        })
    }

    async fn find_answer(&self, id: &AnswerId) -> Result<Option<Answer>, EntityRepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .answer_position(id)
            .map(|position| tables.answers[position].clone()))
    }

    async fn answers_of(
        &self,
        question_id: &QuestionId,
    ) -> Result<Vec<Answer>, EntityRepositoryError> {
        let mut answers = self
            .tables
            .read()
            .await
            .answers
            .iter()
            .filter(|answer| answer.question_id == *question_id)
            .cloned()
            .collect::<Vec<_>>();
        answers.sort_by_key(|answer| answer.created_at);
        Ok(answers)
    }

    async fn apply_best_flags(
        &self,
        question_id: &QuestionId,
        changes: &[BestFlagChange],
        updated_at: DateTime<Utc>,
    ) -> Result<(), EntityRepositoryError> {
        let mut tables = self.tables.write().await;
        let mut positions = Vec::with_capacity(changes.len());
        for change in changes {
            let position = tables
                .answer_position(&change.answer_id)
                .filter(|&position| tables.answers[position].question_id == *question_id)
                .ok_or_else(|| not_found("answer", change.answer_id))?;
            positions.push((position, change.the_best));
        }
        for (position, the_best) in positions {
            let answer = &mut tables.answers[position];
            answer.the_best = the_best;
            answer.updated_at = updated_at;
        }
        Ok(())
    }
}
