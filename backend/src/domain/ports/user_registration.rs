//! Driving port for registering board users.
//!
//! Credential checks belong to an external identity provider; this port only
//! records the identity so questions and answers can reference it.

use async_trait::async_trait;

use crate::domain::{Email, Error, User};

/// Use-case port for user registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistration: Send + Sync {
    /// Return the user registered under `email`, creating it when absent.
    async fn register(&self, email: Email) -> Result<User, Error>;
}
