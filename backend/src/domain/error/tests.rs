//! Tests for the domain error payload.

use super::*;
use crate::domain::validation::{FieldError, ValidationErrors};
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("login required"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("no access"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values(base_error: Error) {
    let result = base_error.try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid trace id");
    let error = TraceId::scope(trace_id, async { Error::forbidden("no access") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_to_camel_case_payload() {
    let error = Error::not_found("question not found")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "questionId": "abc" }));

    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "not_found",
            "message": "question not found",
            "traceId": TRACE_ID,
            "details": { "questionId": "abc" },
        })
    );
}

#[rstest]
fn deserialisation_rejects_blank_message() {
    let payload = json!({ "code": "forbidden", "message": "  " });
    let result = serde_json::from_value::<Error>(payload);
    assert!(result.is_err());
}

#[rstest]
fn validation_errors_convert_to_invalid_request_with_field_details() {
    let errors = ValidationErrors::from(vec![
        FieldError::blank("title"),
        FieldError::blank("body"),
    ]);

    let error = Error::from(errors);

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details attached");
    assert_eq!(details["fieldErrors"][0]["field"], "title");
    assert_eq!(details["fieldErrors"][1]["field"], "body");
}
