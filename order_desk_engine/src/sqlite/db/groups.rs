use sqlx::SqliteConnection;

use crate::db_types::{Group, NewGroup};

pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM auth_groups ORDER BY name").fetch_all(conn).await
}

pub async fn fetch_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM auth_groups WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn insert(group: NewGroup, conn: &mut SqliteConnection) -> Result<Group, sqlx::Error> {
    sqlx::query_as("INSERT INTO auth_groups (name) VALUES ($1) RETURNING *").bind(group.name).fetch_one(conn).await
}

pub async fn rename(id: i64, group: NewGroup, conn: &mut SqliteConnection) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as("UPDATE auth_groups SET name = $1 WHERE id = $2 RETURNING *")
        .bind(group.name)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn delete(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM auth_groups WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
