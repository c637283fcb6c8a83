//! Command handlers for the board service.

use tracing::{debug, info};

use crate::domain::policy::{Action, EntityKind, Target};
use crate::domain::ports::{IndexOperation, MutationOutcome};
use crate::domain::question_locks::QuestionGuard;
use crate::domain::{
    Actor, Answer, AnswerDraft, AnswerId, Error, Question, QuestionChanges, QuestionDraft,
    QuestionId,
};

use super::{BoardService, QuestionDestroyDenial, denial};

impl BoardService {
    pub(super) async fn create_question(
        &self,
        actor: &Actor,
        draft: QuestionDraft,
    ) -> Result<MutationOutcome, Error> {
        self.authorize(actor, Action::Create, Target::New(EntityKind::Question))?;
        let author_id = actor.user_id().ok_or_else(|| denial(actor))?;

        let question = self.store.create_question(author_id, &draft).await?;
        self.outbox.enqueue(question.id, IndexOperation::Upsert);
        info!(question_id = %question.id, author_id = %author_id, "question created");
        Ok(MutationOutcome::Question(question))
    }

    pub(super) async fn update_question(
        &self,
        actor: &Actor,
        question_id: QuestionId,
        changes: QuestionChanges,
    ) -> Result<MutationOutcome, Error> {
        let _guard = self.locks.lock(question_id).await;
        let question = self.store.find_question(&question_id).await?;
        self.authorize(actor, Action::Update, Target::Question(&question))?;

        let updated = self.store.update_question(&question, &changes).await?;
        self.outbox.enqueue(question_id, IndexOperation::Upsert);
        Ok(MutationOutcome::Question(updated))
    }

    pub(super) async fn destroy_question(
        &self,
        actor: &Actor,
        question_id: QuestionId,
    ) -> Result<MutationOutcome, Error> {
        let _guard = self.locks.lock(question_id).await;
        let question = self.store.find_question(&question_id).await?;
        if let Err(error) = self.authorize(actor, Action::Destroy, Target::Question(&question)) {
            return match (self.config.question_destroy_denial, actor) {
                (QuestionDestroyDenial::Ignore, Actor::User(_)) => {
                    debug!(%question_id, "ignoring question destroy by non-author");
                    Ok(MutationOutcome::DestroyIgnored)
                }
                _ => Err(error),
            };
        }

        let removed = self.store.destroy_question(&question).await?;
        self.outbox.enqueue(question_id, IndexOperation::Remove);
        info!(%question_id, answers_removed = removed.len(), "question destroyed");
        Ok(MutationOutcome::Destroyed)
    }

    pub(super) async fn create_answer(
        &self,
        actor: &Actor,
        question_id: QuestionId,
        draft: AnswerDraft,
    ) -> Result<MutationOutcome, Error> {
        let _guard = self.locks.lock(question_id).await;
        let question = self.store.find_question(&question_id).await?;
        self.authorize(actor, Action::Create, Target::New(EntityKind::Answer))?;
        let author_id = actor.user_id().ok_or_else(|| denial(actor))?;

        let answer = self.store.create_answer(&question, author_id, &draft).await?;
        Ok(MutationOutcome::Answer(answer))
    }

    pub(super) async fn update_answer(
        &self,
        actor: &Actor,
        answer_id: AnswerId,
        draft: AnswerDraft,
    ) -> Result<MutationOutcome, Error> {
        let (_guard, answer, question) = self.lock_answer(answer_id).await?;
        self.authorize(
            actor,
            Action::Update,
            Target::Answer {
                answer: &answer,
                question: &question,
            },
        )?;

        let updated = self.store.update_answer(&answer, &draft).await?;
        Ok(MutationOutcome::Answer(updated))
    }

    pub(super) async fn destroy_answer(
        &self,
        actor: &Actor,
        answer_id: AnswerId,
    ) -> Result<MutationOutcome, Error> {
        let (_guard, answer, question) = self.lock_answer(answer_id).await?;
        self.authorize(
            actor,
            Action::Destroy,
            Target::Answer {
                answer: &answer,
                question: &question,
            },
        )?;

        self.store.destroy_answer(&answer).await?;
        Ok(MutationOutcome::Destroyed)
    }

    pub(super) async fn select_best(
        &self,
        actor: &Actor,
        answer_id: AnswerId,
    ) -> Result<MutationOutcome, Error> {
        let (_guard, answer, question) = self.lock_answer(answer_id).await?;
        self.authorize(
            actor,
            Action::SelectBest,
            Target::Answer {
                answer: &answer,
                question: &question,
            },
        )?;

        let selected = self.store.mark_best(&question.id, &answer.id).await?;
        info!(question_id = %question.id, %answer_id, "best answer selected");
        Ok(MutationOutcome::Answer(selected))
    }

    /// Lock the answer's question and load both under the guard.
    async fn lock_answer(
        &self,
        answer_id: AnswerId,
    ) -> Result<(QuestionGuard, Answer, Question), Error> {
        let probe = self.store.find_answer(&answer_id).await?;
        let guard = self.locks.lock(probe.question_id).await;
        // Re-read: the answer may have been destroyed while we waited.
        let answer = self.store.find_answer(&answer_id).await?;
        let question = self.store.find_question(&answer.question_id).await?;
        Ok((guard, answer, question))
    }
}
