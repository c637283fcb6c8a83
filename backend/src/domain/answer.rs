//! Answers posted under a question.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{FieldError, ValidationErrors, is_blank};
use super::{AnswerId, QuestionId, UserId};

/// An answer to a question.
///
/// ## Invariants
/// - `body` is non-empty once trimmed.
/// - At most one answer per `question_id` has `the_best` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Unique identifier.
    pub id: AnswerId,
    /// The owning question.
    pub question_id: QuestionId,
    /// User who wrote the answer.
    pub author_id: UserId,
    /// Answer text.
    pub body: String,
    /// Whether the question's author selected this answer.
    pub the_best: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Attributes submitted when answering or editing an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDraft {
    /// Answer text.
    pub body: String,
}

impl AnswerDraft {
    /// Build a draft from body text.
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Check the field rules for an answer body.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        if is_blank(&self.body) {
            return Err(ValidationErrors::from(vec![FieldError::blank("body")]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", false)]
    #[case("\t", false)]
    #[case("Use a mutex.", true)]
    fn draft_validation(#[case] body: &str, #[case] valid: bool) {
        assert_eq!(AnswerDraft::new(body).validate().is_ok(), valid);
    }
}
