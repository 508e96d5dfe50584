//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong username or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] voltbay_core::UsernameError),

    /// Email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] voltbay_core::EmailError),

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The two password fields do not match.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password hashing failed.
    #[error("hash error: {0}")]
    Hash(String),

    /// Database failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// A message safe to show to the client.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid username or password".to_owned(),
            Self::UserAlreadyExists => "An account with this username already exists".to_owned(),
            Self::InvalidUsername(e) => e.to_string(),
            Self::InvalidEmail(_) => "Invalid email address".to_owned(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::PasswordMismatch => "Passwords do not match".to_owned(),
            Self::Hash(_) | Self::Repository(_) => "Authentication error".to_owned(),
        }
    }
}
