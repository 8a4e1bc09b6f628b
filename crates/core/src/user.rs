//! User records and request validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Validated payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

impl NewUser {
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
        }
    }
}

/// Errors raised while validating user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    #[error("User ID must be a positive integer")]
    InvalidId,
    #[error("Username and email are required")]
    MissingFields,
}

/// Parses a user id from a path segment. Only positive integers are accepted.
pub fn parse_user_id(raw: &str) -> Result<i64, UserValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(UserValidationError::InvalidId),
    }
}

/// Validates a create-user body: `username` and `email` must both be
/// non-blank strings. Other fields are ignored.
pub fn validate_new_user(body: &serde_json::Value) -> Result<NewUser, UserValidationError> {
    let field = |name: &str| {
        body.get(name)
            .and_then(serde_json::Value::as_str)
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string)
    };

    match (field("username"), field("email")) {
        (Some(username), Some(email)) => Ok(NewUser { username, email }),
        _ => Err(UserValidationError::MissingFields),
    }
}
