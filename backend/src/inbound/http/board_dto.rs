//! Request and response payloads for the board endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::MutationOutcome;
use crate::domain::{
    Answer, AnswerDraft, Error, Question, QuestionChanges, QuestionDraft, QuestionThread,
    SearchHit, User,
};

pub(super) const QUESTION_CREATED: &str = "Your question successfully created.";
pub(super) const QUESTION_UPDATED: &str = "Your question successfully updated.";
pub(super) const QUESTION_DESTROYED: &str = "Your question have been successfully destroyed.";
pub(super) const QUESTION_DESTROY_IGNORED: &str = "No access to delete.";
pub(super) const ANSWER_CREATED: &str = "Your answer successfully created.";
pub(super) const ANSWER_UPDATED: &str = "Your answer successfully updated.";
pub(super) const ANSWER_DESTROYED: &str = "Your answer have been successfully destroyed.";
pub(super) const BEST_ANSWER_SELECTED: &str = "Best answer selected.";

/// Request payload for asking a question.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    #[schema(example = "How do I pin a dependency?")]
    pub title: String,
    #[schema(example = "Cargo keeps picking a newer minor release.")]
    pub body: String,
}

impl From<QuestionRequest> for QuestionDraft {
    fn from(value: QuestionRequest) -> Self {
        QuestionDraft::new(value.title, value.body)
    }
}

/// Request payload for editing a question. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPatchRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl From<QuestionPatchRequest> for QuestionChanges {
    fn from(value: QuestionPatchRequest) -> Self {
        QuestionChanges {
            title: value.title,
            body: value.body,
        }
    }
}

/// Request payload for posting or editing an answer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    #[schema(example = "Use an exact version requirement such as `=1.2.3`.")]
    pub body: String,
}

impl From<AnswerRequest> for AnswerDraft {
    fn from(value: AnswerRequest) -> Self {
        AnswerDraft::new(value.body)
    }
}

/// Response payload for a question.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Question> for QuestionResponse {
    fn from(question: Question) -> Self {
        Self {
            id: question.id.to_string(),
            title: question.title,
            body: question.body,
            author_id: question.author_id.to_string(),
            created_at: question.created_at.to_rfc3339(),
            updated_at: question.updated_at.to_rfc3339(),
        }
    }
}

/// Response payload for an answer.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub id: String,
    pub question_id: String,
    pub author_id: String,
    pub body: String,
    pub the_best: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Answer> for AnswerResponse {
    fn from(answer: Answer) -> Self {
        Self {
            id: answer.id.to_string(),
            question_id: answer.question_id.to_string(),
            author_id: answer.author_id.to_string(),
            body: answer.body,
            the_best: answer.the_best,
            created_at: answer.created_at.to_rfc3339(),
            updated_at: answer.updated_at.to_rfc3339(),
        }
    }
}

/// A question with its answers in creation order.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionThreadResponse {
    pub question: QuestionResponse,
    pub best_answer_id: Option<String>,
    pub answers: Vec<AnswerResponse>,
}

impl From<QuestionThread> for QuestionThreadResponse {
    fn from(thread: QuestionThread) -> Self {
        let best_answer_id = thread.best_answer().map(|answer| answer.id.to_string());
        Self {
            question: thread.question.into(),
            best_answer_id,
            answers: thread.answers.into_iter().map(AnswerResponse::from).collect(),
        }
    }
}

/// Confirmation message returned by mutations.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    #[schema(example = "Your question have been successfully destroyed.")]
    pub notice: String,
}

impl NoticeResponse {
    pub(super) fn new(notice: &str) -> Self {
        Self {
            notice: notice.to_owned(),
        }
    }
}

/// A mutated question with its confirmation message.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionNoticeResponse {
    #[schema(example = "Your question successfully created.")]
    pub notice: String,
    pub question: QuestionResponse,
}

/// A mutated answer with its confirmation message.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerNoticeResponse {
    #[schema(example = "Your answer successfully created.")]
    pub notice: String,
    pub answer: AnswerResponse,
}

/// Query string accepted by the search endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SearchParams {
    /// Full-text term matched against title, body, and author email.
    pub q: Option<String>,
    /// Only questions asked by this user.
    pub owner_id: Option<String>,
    /// Only questions created after this RFC 3339 instant.
    pub created_after: Option<String>,
    /// Only questions updated after this RFC 3339 instant.
    pub updated_after: Option<String>,
}

/// One ranked search match.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchHitResponse {
    pub question_id: String,
    pub score: f64,
}

impl From<SearchHit> for SearchHitResponse {
    fn from(hit: SearchHit) -> Self {
        Self {
            question_id: hit.question_id.to_string(),
            score: hit.score,
        }
    }
}

/// Search results ordered by relevance.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub hits: Vec<SearchHitResponse>,
}

/// Request payload for registering a development user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Response payload for a registered user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.into(),
        }
    }
}

fn unexpected(outcome: &MutationOutcome) -> Error {
    Error::internal(format!("unexpected mutation outcome: {outcome:?}"))
}

pub(super) fn expect_question(outcome: MutationOutcome) -> Result<Question, Error> {
    match outcome {
        MutationOutcome::Question(question) => Ok(question),
        other => Err(unexpected(&other)),
    }
}

pub(super) fn expect_answer(outcome: MutationOutcome) -> Result<Answer, Error> {
    match outcome {
        MutationOutcome::Answer(answer) => Ok(answer),
        other => Err(unexpected(&other)),
    }
}
