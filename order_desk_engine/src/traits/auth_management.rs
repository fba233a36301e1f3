use thiserror::Error;

use crate::{db_types::Credentials, helpers::PasswordError};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Could not hash password: {0}")]
    PasswordHashError(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

impl From<PasswordError> for AuthApiError {
    fn from(e: PasswordError) -> Self {
        AuthApiError::PasswordHashError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Fetches the stored credentials for `username`, or `None` if there is no such user.
    async fn fetch_credentials(&self, username: &str) -> Result<Option<Credentials>, AuthApiError>;
}
