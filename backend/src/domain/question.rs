//! Questions and the payloads used to create or edit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{FieldError, ValidationErrors, is_blank};
use super::{Answer, QuestionId, UserId};

/// A question posted on the board.
///
/// ## Invariants
/// - `title` and `body` are non-empty once trimmed.
/// - `author_id` references an existing user and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier.
    pub id: QuestionId,
    /// Headline shown in listings.
    pub title: String,
    /// Full question text.
    pub body: String,
    /// The only user allowed to edit or destroy the question.
    pub author_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Attributes submitted when asking a new question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    /// Requested title.
    pub title: String,
    /// Requested body.
    pub body: String,
}

impl QuestionDraft {
    /// Build a draft from title and body text.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Check the field rules for a new question.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::QuestionDraft;
    ///
    /// let errors = QuestionDraft::new("", " ").validate().expect_err("blank fields");
    /// assert!(errors.contains("title"));
    /// assert!(errors.contains("body"));
    /// ```
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if is_blank(&self.title) {
            errors.push(FieldError::blank("title"));
        }
        if is_blank(&self.body) {
            errors.push(FieldError::blank("body"));
        }
        ValidationErrors::check(errors)
    }
}

/// Partial update for an existing question. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionChanges {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement body.
    pub body: Option<String>,
}

impl QuestionChanges {
    /// Check that every supplied field is non-blank.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if self.title.as_deref().is_some_and(is_blank) {
            errors.push(FieldError::blank("title"));
        }
        if self.body.as_deref().is_some_and(is_blank) {
            errors.push(FieldError::blank("body"));
        }
        ValidationErrors::check(errors)
    }

    /// Produce the updated question, stamping `updated_at`.
    pub fn apply_to(&self, question: &Question, now: DateTime<Utc>) -> Question {
        Question {
            title: self.title.clone().unwrap_or_else(|| question.title.clone()),
            body: self.body.clone().unwrap_or_else(|| question.body.clone()),
            updated_at: now,
            ..question.clone()
        }
    }
}

/// A question together with its answers in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionThread {
    /// The question itself.
    pub question: Question,
    /// Answers ordered by `created_at` ascending.
    pub answers: Vec<Answer>,
}

impl QuestionThread {
    /// The answer currently marked best, if any.
    pub fn best_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|answer| answer.the_best)
    }
}
