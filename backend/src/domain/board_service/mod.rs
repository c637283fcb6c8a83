//! Mutation orchestrator and read-side service for the board.
//!
//! Every mutation resolves its target, asks the policy, mutates the entity
//! store, and only then runs side effects (index outbox, best-answer
//! protocol). Anything touching a question or its answers runs inside that
//! question's critical section.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::policy::{Action, Target, can_perform};
use crate::domain::ports::{
    BoardCommand, Command, EntityRepository, MutationOutcome, SearchIndex, SearchIndexOutbox,
};
use crate::domain::store::EntityStore;
use crate::domain::{Actor, Error, QuestionLocks};

mod commands;
mod query_impl;

/// How a non-author attempt to destroy a question is answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestionDestroyDenial {
    /// Deny with `Forbidden`, like every other unauthorized mutation.
    #[default]
    Reject,
    /// Leave the question intact and report
    /// [`MutationOutcome::DestroyIgnored`].
    Ignore,
}

/// Error returned when parsing an unknown [`QuestionDestroyDenial`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown question destroy denial mode: {0} (expected `reject` or `ignore`)")]
pub struct ParseQuestionDestroyDenialError(String);

impl FromStr for QuestionDestroyDenial {
    type Err = ParseQuestionDestroyDenialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            _ => Err(ParseQuestionDestroyDenialError(s.to_owned())),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardServiceConfig {
    /// Behaviour for non-author question destroys.
    pub question_destroy_denial: QuestionDestroyDenial,
    /// Deadline for search queries.
    pub search_timeout: Duration,
}

impl Default for BoardServiceConfig {
    fn default() -> Self {
        Self {
            question_destroy_denial: QuestionDestroyDenial::default(),
            search_timeout: Duration::from_secs(2),
        }
    }
}

/// Ports the board service is wired to.
pub struct BoardServicePorts {
    /// Authoritative records.
    pub repository: Arc<dyn EntityRepository>,
    /// Index queried by search.
    pub index: Arc<dyn SearchIndex>,
    /// Receives index work after question mutations.
    pub outbox: Arc<dyn SearchIndexOutbox>,
}

/// Domain service implementing [`BoardCommand`], the board query port, and
/// user registration.
pub struct BoardService {
    store: EntityStore,
    index: Arc<dyn SearchIndex>,
    outbox: Arc<dyn SearchIndexOutbox>,
    locks: QuestionLocks,
    config: BoardServiceConfig,
}

impl BoardService {
    /// Wire a service over the given ports.
    pub fn new(ports: BoardServicePorts, clock: Arc<dyn Clock>, config: BoardServiceConfig) -> Self {
        Self {
            store: EntityStore::new(ports.repository, clock),
            index: ports.index,
            outbox: ports.outbox,
            locks: QuestionLocks::default(),
            config,
        }
    }

    /// Underlying entity store.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    fn authorize(&self, actor: &Actor, action: Action, target: Target<'_>) -> Result<(), Error> {
        if can_perform(actor, action, target) {
            return Ok(());
        }
        debug!(?action, actor = ?actor.user_id(), "authorization denied");
        Err(denial(actor))
    }
}

/// Error for a denied action. Anonymous actors are asked to sign in.
fn denial(actor: &Actor) -> Error {
    match actor {
        Actor::Anonymous => Error::unauthorized("sign in to continue"),
        Actor::User(_) => Error::forbidden("no access"),
    }
}

#[async_trait]
impl BoardCommand for BoardService {
    async fn perform(&self, actor: Actor, command: Command) -> Result<MutationOutcome, Error> {
        match command {
            Command::CreateQuestion(draft) => self.create_question(&actor, draft).await,
            Command::UpdateQuestion {
                question_id,
                changes,
            } => self.update_question(&actor, question_id, changes).await,
            Command::DestroyQuestion { question_id } => {
                self.destroy_question(&actor, question_id).await
            }
            Command::CreateAnswer { question_id, draft } => {
                self.create_answer(&actor, question_id, draft).await
            }
            Command::UpdateAnswer { answer_id, draft } => {
                self.update_answer(&actor, answer_id, draft).await
            }
            Command::DestroyAnswer { answer_id } => self.destroy_answer(&actor, answer_id).await,
            Command::SelectBest { answer_id } => self.select_best(&actor, answer_id).await,
        }
    }
}
