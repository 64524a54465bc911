//! Authentication service errors.

use thiserror::Error;

use tally_core::UsernameError;

use crate::db::RepositoryError;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was empty.
    #[error("all fields are required")]
    MissingFields,

    /// The username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// The username is already registered.
    #[error("username already registered")]
    UsernameTaken,

    /// Unknown username or wrong password (indistinguishable by design).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing or hash parsing failed.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
