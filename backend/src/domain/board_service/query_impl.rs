//! Read-side port implementations for the board service.

use async_trait::async_trait;

use crate::domain::policy::{Action, EntityKind, Target};
use crate::domain::ports::{BoardQuery, UserRegistration};
use crate::domain::search_sync::run_query;
use crate::domain::{
    Actor, Answer, AnswerId, Email, Error, Question, QuestionId, QuestionThread, SearchQuery,
    SearchResults, User,
};

use super::BoardService;

#[async_trait]
impl BoardQuery for BoardService {
    async fn list_questions(&self, actor: &Actor) -> Result<Vec<Question>, Error> {
        self.authorize(actor, Action::Read, Target::New(EntityKind::Question))?;
        let mut questions = self.store.list_questions().await?;
        questions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(questions)
    }

    async fn show_question(
        &self,
        actor: &Actor,
        question_id: &QuestionId,
    ) -> Result<QuestionThread, Error> {
        let question = self.store.find_question(question_id).await?;
        self.authorize(actor, Action::Read, Target::Question(&question))?;
        let answers = self.store.answers_of(question_id).await?;
        Ok(QuestionThread { question, answers })
    }

    async fn find_answer(&self, actor: &Actor, answer_id: &AnswerId) -> Result<Answer, Error> {
        let answer = self.store.find_answer(answer_id).await?;
        let question = self.store.find_question(&answer.question_id).await?;
        self.authorize(
            actor,
            Action::Read,
            Target::Answer {
                answer: &answer,
                question: &question,
            },
        )?;
        Ok(answer)
    }

    async fn search(&self, actor: &Actor, query: &SearchQuery) -> Result<SearchResults, Error> {
        self.authorize(actor, Action::Read, Target::New(EntityKind::Question))?;
        run_query(self.index.as_ref(), query, self.config.search_timeout).await
    }
}

#[async_trait]
impl UserRegistration for BoardService {
    async fn register(&self, email: Email) -> Result<User, Error> {
        self.store.register_user(email).await
    }
}
