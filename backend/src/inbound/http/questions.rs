//! Question HTTP handlers.
//!
//! ```text
//! GET    /api/v1/questions
//! GET    /api/v1/questions/{question_id}
//! POST   /api/v1/questions {"title":"...","body":"..."}
//! PATCH  /api/v1/questions/{question_id} {"title":"..."}
//! DELETE /api/v1/questions/{question_id}
//! GET    /api/v1/search?q=cargo&ownerId=...
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;

use crate::domain::SearchQuery;
use crate::domain::ports::{Command, MutationOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::board_dto::{
    NoticeResponse, QUESTION_CREATED, QUESTION_DESTROY_IGNORED, QUESTION_DESTROYED,
    QUESTION_UPDATED, QuestionNoticeResponse, QuestionPatchRequest, QuestionRequest,
    QuestionResponse, QuestionThreadResponse, SearchHitResponse, SearchParams, SearchResponse,
    expect_question,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_timestamp, parse_user_id, question_path_id};

#[derive(Debug, Deserialize)]
struct QuestionPath {
    question_id: String,
}

/// List every question, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/questions",
    responses(
        (status = 200, description = "Questions", body = [QuestionResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "listQuestions",
    security([])
)]
#[get("/questions")]
pub async fn list_questions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<QuestionResponse>>> {
    let actor = session.actor()?;
    let questions = state.query.list_questions(&actor).await?;
    Ok(web::Json(
        questions.into_iter().map(QuestionResponse::from).collect(),
    ))
}

/// Show a question together with its answers.
#[utoipa::path(
    get,
    path = "/api/v1/questions/{question_id}",
    params(("question_id" = String, Path, description = "Question identifier")),
    responses(
        (status = 200, description = "Question with answers", body = QuestionThreadResponse),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "showQuestion",
    security([])
)]
#[get("/questions/{question_id}")]
pub async fn show_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<QuestionPath>,
) -> ApiResult<web::Json<QuestionThreadResponse>> {
    let actor = session.actor()?;
    let question_id = question_path_id(&path.question_id)?;
    let thread = state.query.show_question(&actor, &question_id).await?;
    Ok(web::Json(thread.into()))
}

/// Ask a question as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/questions",
    request_body = QuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionNoticeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "createQuestion"
)]
#[post("/questions")]
pub async fn create_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<QuestionRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.actor()?;
    let outcome = state
        .command
        .perform(actor, Command::CreateQuestion(payload.into_inner().into()))
        .await?;
    let question = expect_question(outcome)?;
    Ok(HttpResponse::Created().json(QuestionNoticeResponse {
        notice: QUESTION_CREATED.to_owned(),
        question: question.into(),
    }))
}

/// Edit a question. Only its author may do so.
#[utoipa::path(
    patch,
    path = "/api/v1/questions/{question_id}",
    request_body = QuestionPatchRequest,
    params(("question_id" = String, Path, description = "Question identifier")),
    responses(
        (status = 200, description = "Question updated", body = QuestionNoticeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "updateQuestion"
)]
#[patch("/questions/{question_id}")]
pub async fn update_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<QuestionPath>,
    payload: web::Json<QuestionPatchRequest>,
) -> ApiResult<web::Json<QuestionNoticeResponse>> {
    let actor = session.actor()?;
    let question_id = question_path_id(&path.question_id)?;
    let outcome = state
        .command
        .perform(
            actor,
            Command::UpdateQuestion {
                question_id,
                changes: payload.into_inner().into(),
            },
        )
        .await?;
    let question = expect_question(outcome)?;
    Ok(web::Json(QuestionNoticeResponse {
        notice: QUESTION_UPDATED.to_owned(),
        question: question.into(),
    }))
}

/// Delete a question and all of its answers.
///
/// When the board is configured to ignore non-author deletes, the request
/// succeeds with a notice and nothing is removed.
#[utoipa::path(
    delete,
    path = "/api/v1/questions/{question_id}",
    params(("question_id" = String, Path, description = "Question identifier")),
    responses(
        (status = 200, description = "Question destroyed, or delete ignored", body = NoticeResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "destroyQuestion"
)]
#[delete("/questions/{question_id}")]
pub async fn destroy_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<QuestionPath>,
) -> ApiResult<web::Json<NoticeResponse>> {
    let actor = session.actor()?;
    let question_id = question_path_id(&path.question_id)?;
    let outcome = state
        .command
        .perform(actor, Command::DestroyQuestion { question_id })
        .await?;
    let notice = match outcome {
        MutationOutcome::DestroyIgnored => QUESTION_DESTROY_IGNORED,
        _ => QUESTION_DESTROYED,
    };
    Ok(web::Json(NoticeResponse::new(notice)))
}

/// Full-text search over questions.
///
/// A blank or missing `q` lists every question admitted by the filters.
#[utoipa::path(
    get,
    path = "/api/v1/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Ranked matches", body = SearchResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Search unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "searchQuestions",
    security([])
)]
#[get("/search")]
pub async fn search_questions(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<SearchResponse>> {
    let actor = session.actor()?;
    let query = build_search_query(params.into_inner())?;
    let results = state.query.search(&actor, &query).await?;
    Ok(web::Json(SearchResponse {
        hits: results.hits().map(SearchHitResponse::from).collect(),
    }))
}

fn build_search_query(params: SearchParams) -> ApiResult<SearchQuery> {
    let mut query = SearchQuery::new(params.q.unwrap_or_default());
    if let Some(owner) = params.owner_id.as_deref() {
        query = query.owned_by(parse_user_id(owner, "ownerId")?);
    }
    if let Some(raw) = params.created_after.as_deref() {
        query = query.created_after(parse_timestamp(raw, "createdAfter")?);
    }
    if let Some(raw) = params.updated_after.as_deref() {
        query = query.updated_after(parse_timestamp(raw, "updatedAfter")?);
    }
    Ok(query)
}

#[cfg(test)]
#[path = "questions_tests.rs"]
mod tests;
