//! Tests for the question HTTP handlers.

use super::*;
use crate::domain::ports::MockBoardQuery;
use crate::domain::{BoardServiceConfig, Error, QuestionDestroyDenial};
use crate::inbound::http::test_utils::{TestService, board_test_app, sign_in};
use crate::test_support::{TestBoard, fast_sync_config};
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

async fn ask(
    app: &impl TestService,
    cookie: Option<Cookie<'static>>,
    title: &str,
) -> ServiceResponse {
    let mut req = actix_test::TestRequest::post()
        .uri("/api/v1/questions")
        .set_json(json!({ "title": title, "body": "Cargo keeps picking a newer release." }));
    if let Some(cookie) = cookie {
        req = req.cookie(cookie);
    }
    actix_test::call_service(app, req.to_request()).await
}

async fn asked_id(app: &impl TestService, cookie: Cookie<'static>, title: &str) -> String {
    let res = ask(app, Some(cookie), title).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    body["question"]["id"]
        .as_str()
        .expect("question id")
        .to_owned()
}

async fn get_json(app: &impl TestService, uri: &str) -> (StatusCode, Value) {
    let req = actix_test::TestRequest::get().uri(uri).to_request();
    let res = actix_test::call_service(app, req).await;
    let status = res.status();
    (status, actix_test::read_body_json(res).await)
}

#[rstest]
#[actix_web::test]
async fn signed_in_user_asks_a_question() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let cookie = sign_in(&app, "ada@example.com").await;

    let res = ask(&app, Some(cookie), "How do I pin a dependency?").await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["notice"], "Your question successfully created.");
    assert_eq!(body["question"]["title"], "How do I pin a dependency?");

    let (status, list) = get_json(&app, "/api/v1/questions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn anonymous_ask_is_unauthorised() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;

    let res = ask(&app, None, "Anyone?").await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let (_, list) = get_json(&app, "/api/v1/questions").await;
    assert_eq!(list, json!([]));
}

#[rstest]
#[actix_web::test]
async fn blank_title_reports_field_errors_and_writes_nothing() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let cookie = sign_in(&app, "ada@example.com").await;

    let res = ask(&app, Some(cookie), "   ").await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["fieldErrors"][0]["field"], "title");
    let (_, list) = get_json(&app, "/api/v1/questions").await;
    assert_eq!(list, json!([]));
}

#[rstest]
#[case("/api/v1/questions/3fa85f64-5717-4562-b3fc-2c963f66afa6")]
#[case("/api/v1/questions/not-a-uuid")]
#[actix_web::test]
async fn unknown_question_is_not_found(#[case] uri: &str) {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;

    let (status, body) = get_json(&app, uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[rstest]
#[actix_web::test]
async fn show_includes_answers_and_best_answer_id() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let author = sign_in(&app, "ada@example.com").await;
    let question_id = asked_id(&app, author.clone(), "Pinning?").await;
    let helper = sign_in(&app, "grace@example.com").await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/questions/{question_id}/answers"))
            .cookie(helper)
            .set_json(json!({ "body": "Use =1.2.3" }))
            .to_request(),
    )
    .await;
    let answer: Value = actix_test::read_body_json(res).await;
    let answer_id = answer["answer"]["id"].as_str().expect("answer id").to_owned();

    let (status, thread) = get_json(&app, &format!("/api/v1/questions/{question_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["answers"][0]["id"], answer_id);
    assert_eq!(thread["bestAnswerId"], Value::Null);
}

#[rstest]
#[actix_web::test]
async fn non_author_cannot_edit() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let author = sign_in(&app, "ada@example.com").await;
    let question_id = asked_id(&app, author, "Original").await;
    let other = sign_in(&app, "grace@example.com").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/questions/{question_id}"))
            .cookie(other)
            .set_json(json!({ "title": "Hijacked" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let (_, thread) = get_json(&app, &format!("/api/v1/questions/{question_id}")).await;
    assert_eq!(thread["question"]["title"], "Original");
}

#[rstest]
#[actix_web::test]
async fn author_edits_title_only() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let author = sign_in(&app, "ada@example.com").await;
    let question_id = asked_id(&app, author.clone(), "Original").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/questions/{question_id}"))
            .cookie(author)
            .set_json(json!({ "title": "Edited" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["notice"], "Your question successfully updated.");
    assert_eq!(body["question"]["title"], "Edited");
    assert_eq!(body["question"]["body"], "Cargo keeps picking a newer release.");
}

#[rstest]
#[case(QuestionDestroyDenial::Reject, StatusCode::FORBIDDEN, None)]
#[case(QuestionDestroyDenial::Ignore, StatusCode::OK, Some("No access to delete."))]
#[actix_web::test]
async fn non_author_destroy_follows_denial_mode(
    #[case] mode: QuestionDestroyDenial,
    #[case] expected_status: StatusCode,
    #[case] expected_notice: Option<&str>,
) {
    let config = BoardServiceConfig {
        question_destroy_denial: mode,
        ..BoardServiceConfig::default()
    };
    let board = TestBoard::with_config(config, fast_sync_config());
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let author = sign_in(&app, "ada@example.com").await;
    let question_id = asked_id(&app, author, "Keep me").await;
    let other = sign_in(&app, "grace@example.com").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/questions/{question_id}"))
            .cookie(other)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected_status);
    let body: Value = actix_test::read_body_json(res).await;
    if let Some(notice) = expected_notice {
        assert_eq!(body["notice"], notice);
    }
    let (status, _) = get_json(&app, &format!("/api/v1/questions/{question_id}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn author_destroys_question() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let author = sign_in(&app, "ada@example.com").await;
    let question_id = asked_id(&app, author.clone(), "Short lived").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/questions/{question_id}"))
            .cookie(author)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["notice"], "Your question have been successfully destroyed.");
    let (status, _) = get_json(&app, &format!("/api/v1/questions/{question_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn search_finds_indexed_questions_by_owner() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let ada = sign_in(&app, "ada@example.com").await;
    let ada_question = asked_id(&app, ada, "Pinning cargo dependencies").await;
    let grace = sign_in(&app, "grace@example.com").await;
    asked_id(&app, grace, "Cargo workspaces").await;
    board.synchronizer.flush().await;

    let (status, all) = get_json(&app, "/api/v1/search?q=cargo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["hits"].as_array().map(Vec::len), Some(2));

    let (_, list) = get_json(&app, "/api/v1/questions").await;
    let ada_id = list
        .as_array()
        .and_then(|questions| {
            questions
                .iter()
                .find(|question| question["id"] == ada_question.as_str())
        })
        .map(|question| question["authorId"].as_str().expect("author id").to_owned())
        .expect("question listed");
    let (_, mine) = get_json(&app, &format!("/api/v1/search?q=cargo&ownerId={ada_id}")).await;
    assert_eq!(mine["hits"][0]["questionId"], ada_question);
    assert_eq!(mine["hits"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn search_rejects_malformed_filters() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;

    let (status, body) = get_json(&app, "/api/v1/search?q=x&createdAfter=yesterday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "createdAfter");
}

#[rstest]
#[actix_web::test]
async fn search_outage_is_service_unavailable() {
    let board = TestBoard::new();
    let mut query = MockBoardQuery::new();
    query
        .expect_search()
        .times(1)
        .returning(|_, _| Err(Error::service_unavailable("search index timed out")));
    let state = HttpState::new(board.service.clone(), Arc::new(query), board.service.clone());
    let app = actix_test::init_service(board_test_app(state)).await;

    let (status, body) = get_json(&app, "/api/v1/search?q=cargo").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
}

#[rstest]
#[actix_web::test]
async fn malformed_body_uses_the_error_payload() {
    let board = TestBoard::new();
    let app = actix_test::init_service(board_test_app(HttpState::from_service(
        board.service.clone(),
    )))
    .await;
    let cookie = sign_in(&app, "ada@example.com").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/questions")
            .cookie(cookie)
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"title": "No body"}"#)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
}
