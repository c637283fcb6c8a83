//! Board users and the actors that act on their behalf.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

/// Validation errors returned by [`Email::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmailValidationError {
    /// The address was blank.
    #[error("email must not be empty")]
    Empty,
    /// The address has no local part, domain, or `@` separator.
    #[error("email must look like local@domain")]
    Malformed,
}

/// Contact address of a user, indexed for search as the author email.
///
/// ## Invariants
/// - Trimmed, non-empty, and shaped like `local@domain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Email;
    ///
    /// let email = Email::new(" ada@example.com ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// assert!(Email::new("nobody").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, EmailValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        match trimmed.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(EmailValidationError::Malformed),
        }
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered board user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Contact address shown in search results.
    pub email: Email,
}

impl User {
    /// Build a user from validated parts.
    pub fn new(id: UserId, email: Email) -> Self {
        Self { id, email }
    }
}

/// Identity attempting an action, resolved by the transport per request.
///
/// The actor is always passed explicitly; nothing in the domain reads an
/// ambient "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    /// Unauthenticated caller. May only read.
    Anonymous,
    /// Signed-in user.
    User(UserId),
}

impl Actor {
    /// The signed-in user id, if any.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{Actor, UserId};
    ///
    /// let id = UserId::random();
    /// assert_eq!(Actor::User(id).user_id(), Some(id));
    /// assert_eq!(Actor::Anonymous.user_id(), None);
    /// ```
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }

    /// Whether this actor is the given user.
    pub fn is(&self, user_id: &UserId) -> bool {
        matches!(self, Self::User(id) if id == user_id)
    }
}

impl From<Option<UserId>> for Actor {
    fn from(value: Option<UserId>) -> Self {
        value.map_or(Self::Anonymous, Self::User)
    }
}
