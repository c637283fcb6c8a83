//! Best-answer selection protocol.
//!
//! Each question is either in [`BestAnswerState::NoBestSelected`] or
//! [`BestAnswerState::BestSelected`]. Selecting an answer computes the full
//! set of flag changes so the repository can apply them in a single atomic
//! step; no intermediate state with two best answers is ever written.

use super::{Answer, AnswerId};

/// Best-answer state of one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestAnswerState {
    /// No answer has been selected yet.
    NoBestSelected,
    /// The identified answer is the accepted one.
    BestSelected(AnswerId),
}

/// A single `the_best` flag write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestFlagChange {
    /// Answer whose flag changes.
    pub answer_id: AnswerId,
    /// New flag value.
    pub the_best: bool,
}

/// Result of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestAnswerTransition {
    /// State after the selection.
    pub state: BestAnswerState,
    /// Flag writes needed to reach `state`. Empty when nothing changes.
    pub changes: Vec<BestFlagChange>,
}

/// Reasons a selection cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BestAnswerError {
    /// The answer is not among the question's answers.
    #[error("answer {0} does not belong to this question")]
    UnknownAnswer(AnswerId),
}

impl BestAnswerState {
    /// Derive the state from a question's answers.
    ///
    /// If storage somehow holds more than one flagged answer, the first one
    /// wins; the next selection clears the rest.
    pub fn of(answers: &[Answer]) -> Self {
        answers
            .iter()
            .find(|answer| answer.the_best)
            .map_or(Self::NoBestSelected, |answer| Self::BestSelected(answer.id))
    }

    #[cfg(test)]
    fn selected(&self) -> Option<AnswerId> {
        match self {
            Self::NoBestSelected => None,
            Self::BestSelected(id) => Some(*id),
        }
    }

    /// Compute the transition for selecting `answer_id` among `answers`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::best_answer::BestAnswerState;
    ///
    /// let transition = BestAnswerState::NoBestSelected.select(&[], backend::domain::AnswerId::random());
    /// assert!(transition.is_err());
    /// ```
    pub fn select(
        &self,
        answers: &[Answer],
        answer_id: AnswerId,
    ) -> Result<BestAnswerTransition, BestAnswerError> {
        if !answers.iter().any(|answer| answer.id == answer_id) {
            return Err(BestAnswerError::UnknownAnswer(answer_id));
        }

        let changes = answers
            .iter()
            .filter_map(|answer| {
                let wanted = answer.id == answer_id;
                (answer.the_best != wanted).then_some(BestFlagChange {
                    answer_id: answer.id,
                    the_best: wanted,
                })
            })
            .collect();

        Ok(BestAnswerTransition {
            state: Self::BestSelected(answer_id),
            changes,
        })
    }
}

/// Apply flag changes to an in-memory answer list.
pub fn apply_changes(answers: &mut [Answer], changes: &[BestFlagChange]) {
    for change in changes {
        if let Some(answer) = answers.iter_mut().find(|a| a.id == change.answer_id) {
            answer.the_best = change.the_best;
        }
    }
}
