use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Role, Roles},
    helpers::verify_password_async,
    traits::{AuthApiError, AuthManagement},
};

/// An account whose password has been checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub roles: Roles,
}

pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Checks a username and password. Unknown users, accounts without a password and wrong passwords all produce
    /// [`AuthApiError::InvalidCredentials`].
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthenticatedUser, AuthApiError> {
        let credentials = self.db.fetch_credentials(username).await?.ok_or_else(|| {
            debug!("🔐️ Login attempt for unknown user {username}");
            AuthApiError::InvalidCredentials
        })?;
        let Some(hash) = credentials.password_hash else {
            debug!("🔐️ Login attempt for {username}, who has no password set");
            return Err(AuthApiError::InvalidCredentials);
        };
        if !verify_password_async(password.to_string(), hash).await? {
            debug!("🔐️ Wrong password for {username}");
            return Err(AuthApiError::InvalidCredentials);
        }
        let roles = Role::for_account(credentials.is_admin);
        trace!("🔐️ {username} authenticated with roles {roles:?}");
        Ok(AuthenticatedUser { id: credentials.id, username: credentials.username, roles })
    }
}
