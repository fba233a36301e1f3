//! Users and groups.

use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Group, NewGroup, NewUser, User, UserUpdate},
    helpers::hash_password_async,
    traits::{AccountApiError, AccountManagement},
};

/// The `AccountApi` validates account data and hashes passwords before handing them to the backend.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn users(&self) -> Result<Vec<User>, AccountApiError> {
        self.db.fetch_users().await
    }

    pub async fn user(&self, id: i64) -> Result<Option<User>, AccountApiError> {
        self.db.fetch_user(id).await
    }

    pub async fn create_user(&self, user: NewUser) -> Result<User, AccountApiError> {
        user.validate()?;
        let hash = match &user.password {
            Some(password) => Some(hash_password_async(password.reveal().clone()).await?),
            None => None,
        };
        let user = self.db.insert_user(user, hash).await?;
        info!("🧑️ User #{} ({}) created", user.id, user.username);
        Ok(user)
    }

    /// Replaces a user's details. The stored password is kept if the replacement does not carry one.
    pub async fn replace_user(&self, id: i64, user: NewUser) -> Result<Option<User>, AccountApiError> {
        user.validate()?;
        self.update_user(id, UserUpdate::from(user)).await
    }

    pub async fn update_user(&self, id: i64, update: UserUpdate) -> Result<Option<User>, AccountApiError> {
        update.validate()?;
        let hash = match &update.password {
            Some(password) => Some(hash_password_async(password.reveal().clone()).await?),
            None => None,
        };
        if hash.is_some() {
            debug!("🧑️ Password for user #{id} is being changed");
        }
        self.db.update_user(id, update, hash).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<bool, AccountApiError> {
        let deleted = self.db.delete_user(id).await?;
        if deleted {
            info!("🧑️ User #{id} deleted");
        }
        Ok(deleted)
    }

    /// Makes sure an administrator account called `username` exists. Returns `true` if it had to be created.
    ///
    /// An existing account is left untouched, even if it is not an administrator.
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<bool, AccountApiError> {
        if let Some(user) = self.db.fetch_user_by_username(username).await? {
            if !user.is_admin {
                warn!("🧑️ The bootstrap account {username} exists but is not an administrator");
            }
            return Ok(false);
        }
        let admin = NewUser::new(username).with_password(password).as_admin();
        self.create_user(admin).await?;
        Ok(true)
    }

    pub async fn groups(&self) -> Result<Vec<Group>, AccountApiError> {
        self.db.fetch_groups().await
    }

    pub async fn group(&self, id: i64) -> Result<Option<Group>, AccountApiError> {
        self.db.fetch_group(id).await
    }

    pub async fn create_group(&self, group: NewGroup) -> Result<Group, AccountApiError> {
        group.validate()?;
        let group = self.db.insert_group(group).await?;
        debug!("🧑️ Group #{} ({}) created", group.id, group.name);
        Ok(group)
    }

    pub async fn update_group(&self, id: i64, group: NewGroup) -> Result<Option<Group>, AccountApiError> {
        group.validate()?;
        self.db.update_group(id, group).await
    }

    pub async fn delete_group(&self, id: i64) -> Result<bool, AccountApiError> {
        self.db.delete_group(id).await
    }
}
