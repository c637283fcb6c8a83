//! Tests for the answer HTTP handlers.

use super::*;
use crate::domain::ports::{MockBoardCommand, MutationOutcome};
use crate::inbound::http::test_utils::{TestService, board_test_app, sign_in};
use crate::test_support::TestBoard;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

struct Thread {
    question_id: String,
    author: Cookie<'static>,
    helper: Cookie<'static>,
}

async fn send(
    app: &impl TestService,
    req: actix_test::TestRequest,
    cookie: &Cookie<'static>,
) -> (StatusCode, Value) {
    let res = actix_test::call_service(app, req.cookie(cookie.clone()).to_request()).await;
    let status = res.status();
    (status, actix_test::read_body_json(res).await)
}

async fn open_thread(app: &impl TestService) -> Thread {
    let author = sign_in(app, "ada@example.com").await;
    let (status, body) = send(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/questions")
            .set_json(json!({ "title": "Pinning?", "body": "How?" })),
        &author,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let helper = sign_in(app, "grace@example.com").await;
    Thread {
        question_id: body["question"]["id"].as_str().expect("id").to_owned(),
        author,
        helper,
    }
}

async fn answer(
    app: &impl TestService,
    thread: &Thread,
    cookie: &Cookie<'static>,
    text: &str,
) -> String {
    let (status, body) = send(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/questions/{}/answers", thread.question_id))
            .set_json(json!({ "body": text })),
        cookie,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["notice"], "Your answer successfully created.");
    body["answer"]["id"].as_str().expect("answer id").to_owned()
}

async fn select(
    app: &impl TestService,
    answer_id: &str,
    cookie: &Cookie<'static>,
) -> (StatusCode, Value) {
    send(
        app,
        actix_test::TestRequest::patch().uri(&format!("/api/v1/answers/{answer_id}/best")),
        cookie,
    )
    .await
}

async fn best_flags(app: &impl TestService, thread: &Thread) -> Vec<bool> {
    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/questions/{}", thread.question_id))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(app, req).await;
    body["answers"]
        .as_array()
        .expect("answers")
        .iter()
        .map(|answer| answer["theBest"].as_bool().expect("flag"))
        .collect()
}

#[rstest]
#[actix_web::test]
async fn question_author_switches_best_answer() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let thread = open_thread(&app).await;
    let first = answer(&app, &thread, &thread.helper, "Use =1.2.3").await;
    let second = answer(&app, &thread, &thread.helper, "Commit Cargo.lock").await;

    let (status, body) = select(&app, &first, &thread.author).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"], "Best answer selected.");
    assert_eq!(body["answer"]["theBest"], true);
    assert_eq!(best_flags(&app, &thread).await, vec![true, false]);

    let (status, _) = select(&app, &second, &thread.author).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(best_flags(&app, &thread).await, vec![false, true]);
}

#[rstest]
#[actix_web::test]
async fn answer_author_cannot_select_their_own_answer() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let thread = open_thread(&app).await;
    let answer_id = answer(&app, &thread, &thread.helper, "Use =1.2.3").await;

    let (status, body) = select(&app, &answer_id, &thread.helper).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
    assert_eq!(best_flags(&app, &thread).await, vec![false]);
}

#[rstest]
#[actix_web::test]
async fn answer_author_edits_and_destroys() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let thread = open_thread(&app).await;
    let answer_id = answer(&app, &thread, &thread.helper, "Use =1.2.3").await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/answers/{answer_id}"))
            .set_json(json!({ "body": "Use an exact requirement" })),
        &thread.helper,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"], "Your answer successfully updated.");
    assert_eq!(body["answer"]["body"], "Use an exact requirement");

    let (status, body) = send(
        &app,
        actix_test::TestRequest::delete().uri(&format!("/api/v1/answers/{answer_id}")),
        &thread.helper,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"], "Your answer have been successfully destroyed.");
    assert!(best_flags(&app, &thread).await.is_empty());
}

#[rstest]
#[actix_web::test]
async fn question_author_cannot_destroy_someone_elses_answer() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let thread = open_thread(&app).await;
    let answer_id = answer(&app, &thread, &thread.helper, "Use =1.2.3").await;

    let (status, _) = send(
        &app,
        actix_test::TestRequest::delete().uri(&format!("/api/v1/answers/{answer_id}")),
        &thread.author,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(best_flags(&app, &thread).await, vec![false]);
}

#[rstest]
#[actix_web::test]
async fn blank_answer_is_rejected() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let thread = open_thread(&app).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/questions/{}/answers", thread.question_id))
            .set_json(json!({ "body": "  " })),
        &thread.helper,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["fieldErrors"][0]["field"], "body");
    assert!(best_flags(&app, &thread).await.is_empty());
}

#[rstest]
#[actix_web::test]
async fn answering_a_missing_question_is_not_found() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let cookie = sign_in(&app, "grace@example.com").await;

    let (status, _) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/questions/3fa85f64-5717-4562-b3fc-2c963f66afa6/answers")
            .set_json(json!({ "body": "Hello?" })),
        &cookie,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn unexpected_outcome_is_redacted_internal_error() {
    let board = TestBoard::new();
    let mut command = MockBoardCommand::new();
    command
        .expect_perform()
        .times(1)
        .returning(|_, _| Ok(MutationOutcome::Destroyed));
    let state = HttpState::new(Arc::new(command), board.service.clone(), board.service.clone());
    let app = actix_test::init_service(board_test_app(state)).await;
    let cookie = sign_in(&app, "grace@example.com").await;

    let (status, body) = select(&app, "3fa85f64-5717-4562-b3fc-2c963f66afa6", &cookie).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}
