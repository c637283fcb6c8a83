//! Strongly typed identifiers for users, questions, and answers.
//!
//! Each identifier wraps a UUID so a question id can never be passed where an
//! answer id is expected. Parsing rejects blank or padded input before
//! delegating to [`Uuid::parse_str`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when parsing an identifier from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// The input was empty.
    #[error("{kind} id must not be empty")]
    Empty {
        /// Entity the identifier belongs to.
        kind: &'static str,
    },
    /// The input was not a canonical UUID.
    #[error("{kind} id must be a valid UUID")]
    Invalid {
        /// Entity the identifier belongs to.
        kind: &'static str,
    },
}

fn parse_uuid(kind: &'static str, raw: &str) -> Result<Uuid, IdParseError> {
    if raw.is_empty() {
        return Err(IdParseError::Empty { kind });
    }
    if raw.trim() != raw {
        return Err(IdParseError::Invalid { kind });
    }
    Uuid::parse_str(raw).map_err(|_| IdParseError::Invalid { kind })
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct an identifier from text.
            pub fn new(id: impl AsRef<str>) -> Result<Self, IdParseError> {
                parse_uuid($kind, id.as_ref()).map(Self)
            }

            /// Generate a new random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_entity_id!(
    /// Stable user identifier.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    UserId,
    "user"
);

define_entity_id!(
    /// Stable question identifier.
    QuestionId,
    "question"
);

define_entity_id!(
    /// Stable answer identifier.
    AnswerId,
    "answer"
);
