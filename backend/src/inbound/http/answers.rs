//! Answer HTTP handlers.
//!
//! ```text
//! POST   /api/v1/questions/{question_id}/answers {"body":"..."}
//! PATCH  /api/v1/answers/{answer_id} {"body":"..."}
//! DELETE /api/v1/answers/{answer_id}
//! PATCH  /api/v1/answers/{answer_id}/best
//! ```

use actix_web::{HttpResponse, delete, patch, post, web};
use serde::Deserialize;

use crate::domain::ports::Command;
use crate::inbound::http::ApiResult;
use crate::inbound::http::board_dto::{
    ANSWER_CREATED, ANSWER_DESTROYED, ANSWER_UPDATED, AnswerNoticeResponse, AnswerRequest,
    BEST_ANSWER_SELECTED, NoticeResponse, expect_answer,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{answer_path_id, question_path_id};

#[derive(Debug, Deserialize)]
struct QuestionPath {
    question_id: String,
}

#[derive(Debug, Deserialize)]
struct AnswerPath {
    answer_id: String,
}

async fn answer_notice(
    state: &HttpState,
    session: &SessionContext,
    command: Command,
    notice: &str,
) -> ApiResult<AnswerNoticeResponse> {
    let outcome = state.command.perform(session.actor()?, command).await?;
    let answer = expect_answer(outcome)?;
    Ok(AnswerNoticeResponse {
        notice: notice.to_owned(),
        answer: answer.into(),
    })
}

/// Answer a question as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/questions/{question_id}/answers",
    request_body = AnswerRequest,
    params(("question_id" = String, Path, description = "Question identifier")),
    responses(
        (status = 201, description = "Answer created", body = AnswerNoticeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "createAnswer"
)]
#[post("/questions/{question_id}/answers")]
pub async fn create_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<QuestionPath>,
    payload: web::Json<AnswerRequest>,
) -> ApiResult<HttpResponse> {
    let question_id = question_path_id(&path.question_id)?;
    let command = Command::CreateAnswer {
        question_id,
        draft: payload.into_inner().into(),
    };
    let body = answer_notice(&state, &session, command, ANSWER_CREATED).await?;
    Ok(HttpResponse::Created().json(body))
}

/// Edit an answer. Only its author may do so.
#[utoipa::path(
    patch,
    path = "/api/v1/answers/{answer_id}",
    request_body = AnswerRequest,
    params(("answer_id" = String, Path, description = "Answer identifier")),
    responses(
        (status = 200, description = "Answer updated", body = AnswerNoticeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "updateAnswer"
)]
#[patch("/answers/{answer_id}")]
pub async fn update_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<AnswerPath>,
    payload: web::Json<AnswerRequest>,
) -> ApiResult<web::Json<AnswerNoticeResponse>> {
    let answer_id = answer_path_id(&path.answer_id)?;
    let command = Command::UpdateAnswer {
        answer_id,
        draft: payload.into_inner().into(),
    };
    let body = answer_notice(&state, &session, command, ANSWER_UPDATED).await?;
    Ok(web::Json(body))
}

/// Delete an answer. Only its author may do so.
#[utoipa::path(
    delete,
    path = "/api/v1/answers/{answer_id}",
    params(("answer_id" = String, Path, description = "Answer identifier")),
    responses(
        (status = 200, description = "Answer destroyed", body = NoticeResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "destroyAnswer"
)]
#[delete("/answers/{answer_id}")]
pub async fn destroy_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<AnswerPath>,
) -> ApiResult<web::Json<NoticeResponse>> {
    let answer_id = answer_path_id(&path.answer_id)?;
    state
        .command
        .perform(session.actor()?, Command::DestroyAnswer { answer_id })
        .await?;
    Ok(web::Json(NoticeResponse::new(ANSWER_DESTROYED)))
}

/// Mark an answer as the best answer to its question.
///
/// Only the question's author may select. Selecting the current best answer
/// again succeeds without changes.
#[utoipa::path(
    patch,
    path = "/api/v1/answers/{answer_id}/best",
    params(("answer_id" = String, Path, description = "Answer identifier")),
    responses(
        (status = 200, description = "Best answer selected", body = AnswerNoticeResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "selectBestAnswer"
)]
#[patch("/answers/{answer_id}/best")]
pub async fn select_best_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<AnswerPath>,
) -> ApiResult<web::Json<AnswerNoticeResponse>> {
    let answer_id = answer_path_id(&path.answer_id)?;
    let body = answer_notice(
        &state,
        &session,
        Command::SelectBest { answer_id },
        BEST_ANSWER_SELECTED,
    )
    .await?;
    Ok(web::Json(body))
}

#[cfg(test)]
#[path = "answers_tests.rs"]
mod tests;
