use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Validate, validate};
use crate::error::DomainError;

/// User entity - the account a post is authored by.
///
/// Accounts are owned by the authentication subsystem; posts only need a
/// stable id to point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub const USERNAME_MAX_LEN: usize = 150;

    /// Create a new user with generated ID and timestamp.
    pub fn new(username: impl Into<String>) -> Result<Self, DomainError> {
        let user = Self {
            id: Uuid::new_v4(),
            username: username.into(),
            created_at: Utc::now(),
        };
        user.validate()?;
        Ok(user)
    }
}

impl Validate for User {
    fn validate(&self) -> Result<(), DomainError> {
        validate::bounded("user", "username", &self.username, Self::USERNAME_MAX_LEN)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}
