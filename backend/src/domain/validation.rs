//! Field-level validation failures raised by the entity store.
//!
//! A [`ValidationErrors`] value lists every failing field so adapters can
//! re-surface the submitted form with all problems attached at once.

use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorReason {
    /// The value was empty once trimmed of whitespace.
    Blank,
    /// The value does not have the expected shape.
    Malformed,
    /// The value references a row that does not exist.
    UnknownReference,
}

impl FieldErrorReason {
    fn describe(self) -> &'static str {
        match self {
            Self::Blank => "can't be blank",
            Self::Malformed => "is invalid",
            Self::UnknownReference => "must exist",
        }
    }
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending attribute, e.g. `title`.
    pub field: &'static str,
    /// Machine-readable failure reason.
    pub reason: FieldErrorReason,
}

impl FieldError {
    /// Build an error for `field` with the given reason.
    pub fn new(field: &'static str, reason: FieldErrorReason) -> Self {
        Self { field, reason }
    }

    /// Shorthand for a blank field.
    pub fn blank(field: &'static str) -> Self {
        Self::new(field, FieldErrorReason::Blank)
    }

    /// Shorthand for a dangling reference.
    pub fn unknown_reference(field: &'static str) -> Self {
        Self::new(field, FieldErrorReason::UnknownReference)
    }

    /// Wrap this single failure as a [`ValidationErrors`].
    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors(vec![self])
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason.describe())
    }
}

/// Non-empty collection of field errors.
///
/// # Examples
/// ```
/// use backend::domain::{FieldError, ValidationErrors};
///
/// let errors = ValidationErrors::from(vec![FieldError::blank("title")]);
/// assert_eq!(errors.to_string(), "title can't be blank");
/// assert!(errors.contains("title"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Return `Ok(())` when `errors` is empty, otherwise wrap them.
    pub fn check(errors: Vec<FieldError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }

    /// Borrow the individual field errors.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Consume the collection, returning the field errors.
    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    /// Whether `field` is among the failing fields.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// Structured payload attached to the domain error.
    pub fn to_details(&self) -> Value {
        let field_errors = self
            .0
            .iter()
            .map(|error| {
                json!({
                    "field": error.field,
                    "reason": error.reason,
                    "message": error.to_string(),
                })
            })
            .collect::<Vec<_>>();
        json!({ "fieldErrors": field_errors })
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Returns true when `value` is empty after trimming.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn check_accepts_empty_list() {
        assert!(ValidationErrors::check(Vec::new()).is_ok());
    }

    #[rstest]
    fn display_joins_all_fields() {
        let errors = ValidationErrors::check(vec![
            FieldError::blank("title"),
            FieldError::unknown_reference("author_id"),
        ])
        .expect_err("errors present");
        assert_eq!(errors.to_string(), "title can't be blank, author_id must exist");
    }

    #[rstest]
    fn details_list_reasons() {
        let errors = ValidationErrors::from(vec![FieldError::blank("body")]);
        let details = errors.to_details();
        assert_eq!(details["fieldErrors"][0]["reason"], "blank");
        assert_eq!(details["fieldErrors"][0]["message"], "body can't be blank");
    }

    #[rstest]
    #[case("", true)]
    #[case("   \n", true)]
    #[case(" x ", false)]
    fn blank_detection(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_blank(value), expected);
    }
}
