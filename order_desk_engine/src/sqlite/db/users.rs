use chrono::Utc;
use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use super::groups;
use crate::{
    db_types::{Credentials, NewUser, User, UserRecord, UserUpdate},
    traits::AccountApiError,
};

const USER_COLUMNS: &str = "id, username, email, is_admin, date_joined";

pub async fn group_ids(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT group_id FROM user_group_members WHERE user_id = $1 ORDER BY group_id")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

async fn with_groups(record: UserRecord, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let groups = group_ids(record.id, conn).await?;
    Ok(record.into_user(groups))
}

/// All users, most recently joined first.
pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<User>, sqlx::Error> {
    let records: Vec<UserRecord> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY date_joined DESC, id DESC"))
            .fetch_all(&mut *conn)
            .await?;
    let mut users = Vec::with_capacity(records.len());
    for record in records {
        users.push(with_groups(record, &mut *conn).await?);
    }
    Ok(users)
}

pub async fn fetch_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let record: Option<UserRecord> = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    match record {
        Some(r) => Ok(Some(with_groups(r, conn).await?)),
        None => Ok(None),
    }
}

pub async fn fetch_by_username(username: &str, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let record: Option<UserRecord> = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
    match record {
        Some(r) => Ok(Some(with_groups(r, conn).await?)),
        None => Ok(None),
    }
}

pub async fn fetch_credentials(username: &str, conn: &mut SqliteConnection) -> Result<Option<Credentials>, sqlx::Error> {
    sqlx::query_as("SELECT id, username, password_hash, is_admin FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(conn)
        .await
}

/// Inserts the user row only. Group memberships are written with [`set_groups`].
pub async fn insert(
    user: &NewUser,
    password_hash: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
            INSERT INTO users (username, email, password_hash, is_admin, date_joined)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id;
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(password_hash)
    .bind(user.is_admin)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
}

/// Updates the scalar fields of a user. Returns `false` if the user does not exist.
pub async fn update(
    id: i64,
    update: &UserUpdate,
    password_hash: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE users SET id = id");
    if let Some(username) = &update.username {
        builder.push(", username = ");
        builder.push_bind(username.clone());
    }
    if let Some(email) = &update.email {
        builder.push(", email = ");
        builder.push_bind(email.clone());
    }
    if let Some(is_admin) = update.is_admin {
        builder.push(", is_admin = ");
        builder.push_bind(is_admin);
    }
    if let Some(hash) = password_hash {
        builder.push(", password_hash = ");
        builder.push_bind(hash);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Replaces the user's group memberships. Every group must exist.
pub async fn set_groups(user_id: i64, groups: &[i64], conn: &mut SqliteConnection) -> Result<(), AccountApiError> {
    for group_id in groups {
        if groups::fetch_by_id(*group_id, &mut *conn).await?.is_none() {
            return Err(AccountApiError::GroupNotFound(*group_id));
        }
    }
    sqlx::query("DELETE FROM user_group_members WHERE user_id = $1").bind(user_id).execute(&mut *conn).await?;
    for group_id in groups {
        sqlx::query("INSERT OR IGNORE INTO user_group_members (user_id, group_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(group_id)
            .execute(&mut *conn)
            .await?;
    }
    trace!("🗃️ User #{user_id} is now a member of groups {groups:?}");
    Ok(())
}

pub async fn delete(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
