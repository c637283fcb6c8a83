//! Driving port for every board mutation.
//!
//! Inbound adapters resolve the actor and call [`BoardCommand::perform`];
//! nothing else writes questions or answers.

use async_trait::async_trait;

use crate::domain::policy::Action;
use crate::domain::{
    Actor, Answer, AnswerDraft, AnswerId, Error, Question, QuestionChanges, QuestionDraft,
    QuestionId,
};

/// A mutation requested by an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask a new question authored by the actor.
    CreateQuestion(QuestionDraft),
    /// Edit a question.
    UpdateQuestion {
        /// Target question.
        question_id: QuestionId,
        /// Fields to replace.
        changes: QuestionChanges,
    },
    /// Delete a question and its answers.
    DestroyQuestion {
        /// Target question.
        question_id: QuestionId,
    },
    /// Answer a question as the actor.
    CreateAnswer {
        /// Question being answered.
        question_id: QuestionId,
        /// Answer text.
        draft: AnswerDraft,
    },
    /// Edit an answer's body.
    UpdateAnswer {
        /// Target answer.
        answer_id: AnswerId,
        /// Replacement text.
        draft: AnswerDraft,
    },
    /// Delete an answer.
    DestroyAnswer {
        /// Target answer.
        answer_id: AnswerId,
    },
    /// Mark an answer as its question's best answer.
    SelectBest {
        /// Answer to select.
        answer_id: AnswerId,
    },
}

impl Command {
    /// The policy action this command is authorized against.
    pub fn action(&self) -> Action {
        match self {
            Self::CreateQuestion(_) | Self::CreateAnswer { .. } => Action::Create,
            Self::UpdateQuestion { .. } | Self::UpdateAnswer { .. } => Action::Update,
            Self::DestroyQuestion { .. } | Self::DestroyAnswer { .. } => Action::Destroy,
            Self::SelectBest { .. } => Action::SelectBest,
        }
    }
}

/// Successful result of [`BoardCommand::perform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The created or updated question.
    Question(Question),
    /// The created, updated, or newly selected answer.
    Answer(Answer),
    /// The target was deleted.
    Destroyed,
    /// A non-author question destroy was accepted without deleting anything.
    DestroyIgnored,
}

/// Driving port for board mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardCommand: Send + Sync {
    /// Authorize and apply `command` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the target question or answer does not exist.
    /// - `Unauthorized` when an anonymous actor attempts a mutation.
    /// - `Forbidden` when a signed-in actor lacks permission.
    /// - `InvalidRequest` with field details when validation fails.
    ///
    /// Search index failures are never reported here.
    async fn perform(&self, actor: Actor, command: Command) -> Result<MutationOutcome, Error>;
}
