//! Shared parsing helpers for inbound HTTP adapters.
//!
//! Path identifiers that do not parse are reported as missing records, the
//! same way an unknown id is. Query and body fields that do not parse are
//! reported as invalid requests naming the field.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{AnswerId, Email, Error, QuestionId, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    InvalidEmail,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidEmail => "invalid_email",
        }
    }
}

fn field_error(field: &str, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn question_path_id(raw: &str) -> Result<QuestionId, Error> {
    QuestionId::new(raw).map_err(|_| Error::not_found(format!("question {raw} not found")))
}

pub(crate) fn answer_path_id(raw: &str) -> Result<AnswerId, Error> {
    AnswerId::new(raw).map_err(|_| Error::not_found(format!("answer {raw} not found")))
}

pub(crate) fn parse_user_id(value: &str, field: &str) -> Result<UserId, Error> {
    UserId::new(value).map_err(|err| {
        field_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{field} must be a valid UUID: {err}"),
            value,
        )
    })
}

pub(crate) fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            field_error(
                field,
                ErrorCode::InvalidTimestamp,
                format!("{field} must be an RFC 3339 timestamp"),
                value,
            )
        })
}

pub(crate) fn parse_email(value: &str) -> Result<Email, Error> {
    Email::new(value).map_err(|err| {
        field_error("email", ErrorCode::InvalidEmail, err.to_string(), value)
    })
}
