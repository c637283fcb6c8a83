//! Authorization policy for board mutations.
//!
//! [`can_perform`] is a pure decision over a closed set of actions and
//! targets. It never consults the store; callers resolve the target first and
//! pass the loaded entities in.

use super::{Actor, Answer, Question};

/// What the actor is attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Create a new question or answer.
    Create,
    /// Browse a question or answer.
    Read,
    /// Edit an existing entity.
    Update,
    /// Remove an existing entity.
    Destroy,
    /// Mark an answer as the best one for its question.
    SelectBest,
}

/// Kind of entity named by a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A question.
    Question,
    /// An answer.
    Answer,
}

/// The entity an action is evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// An entity that does not exist yet.
    New(EntityKind),
    /// An existing question.
    Question(&'a Question),
    /// An existing answer together with the question it belongs to.
    Answer {
        /// The answer itself.
        answer: &'a Answer,
        /// The owning question.
        question: &'a Question,
    },
}

/// Decide whether `actor` may perform `action` on `target`.
///
/// # Examples
/// ```
/// use backend::domain::policy::{Action, EntityKind, Target, can_perform};
/// use backend::domain::{Actor, UserId};
///
/// let anonymous = Actor::Anonymous;
/// assert!(can_perform(&anonymous, Action::Read, Target::New(EntityKind::Question)));
/// assert!(!can_perform(&anonymous, Action::Create, Target::New(EntityKind::Question)));
/// assert!(can_perform(
///     &Actor::User(UserId::random()),
///     Action::Create,
///     Target::New(EntityKind::Answer),
/// ));
/// ```
pub fn can_perform(actor: &Actor, action: Action, target: Target<'_>) -> bool {
    match (action, target) {
        (Action::Read, _) => true,
        (Action::Create, Target::New(_)) => actor.user_id().is_some(),
        (Action::Create, Target::Question(_) | Target::Answer { .. }) => false,
        (Action::Update | Action::Destroy, Target::Question(question)) => {
            actor.is(&question.author_id)
        }
        (Action::Update | Action::Destroy, Target::Answer { answer, .. }) => {
            actor.is(&answer.author_id)
        }
        (Action::SelectBest, Target::Answer { question, .. }) => actor.is(&question.author_id),
        (
            Action::Update | Action::Destroy | Action::SelectBest,
            Target::New(_),
        ) => false,
        (Action::SelectBest, Target::Question(_)) => false,
    }
}
