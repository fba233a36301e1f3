use thiserror::Error;

use crate::{
    db_types::{Group, NewGroup, NewUser, User, UserUpdate, ValidationError},
    helpers::PasswordError,
};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid account data: {0}")]
    ValidationError(String),
    #[error("The username {0} is already taken")]
    UsernameTaken(String),
    #[error("A group called {0} already exists")]
    GroupNameTaken(String),
    #[error("Group {0} does not exist")]
    GroupNotFound(i64),
    #[error("Could not hash password: {0}")]
    PasswordError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

impl From<PasswordError> for AccountApiError {
    fn from(e: PasswordError) -> Self {
        AccountApiError::PasswordError(e.to_string())
    }
}

impl From<ValidationError> for AccountApiError {
    fn from(e: ValidationError) -> Self {
        AccountApiError::ValidationError(e.0)
    }
}

/// User and group administration.
///
/// Passwords never pass through this trait in the clear. Callers hash them first and hand over the encoded hash.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// All users, newest first.
    async fn fetch_users(&self) -> Result<Vec<User>, AccountApiError>;

    async fn fetch_user(&self, id: i64) -> Result<Option<User>, AccountApiError>;

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, AccountApiError>;

    /// Creates a user together with its group memberships.
    async fn insert_user(&self, user: NewUser, password_hash: Option<String>) -> Result<User, AccountApiError>;

    /// Applies the update. `password_hash`, if given, replaces the stored hash. Returns `None` if the user does not
    /// exist.
    async fn update_user(
        &self,
        id: i64,
        update: UserUpdate,
        password_hash: Option<String>,
    ) -> Result<Option<User>, AccountApiError>;

    async fn delete_user(&self, id: i64) -> Result<bool, AccountApiError>;

    /// All groups, ordered by name.
    async fn fetch_groups(&self) -> Result<Vec<Group>, AccountApiError>;

    async fn fetch_group(&self, id: i64) -> Result<Option<Group>, AccountApiError>;

    async fn insert_group(&self, group: NewGroup) -> Result<Group, AccountApiError>;

    async fn update_group(&self, id: i64, group: NewGroup) -> Result<Option<Group>, AccountApiError>;

    /// Deletes the group. Memberships are removed with it.
    async fn delete_group(&self, id: i64) -> Result<bool, AccountApiError>;
}
