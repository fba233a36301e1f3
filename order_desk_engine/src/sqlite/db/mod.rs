//! # SQLite database methods
//!
//! Low-level SQLite interactions, written as free functions that take a `&mut SqliteConnection`. Callers can pass a
//! pooled connection, or `&mut *tx` to run several of them inside one transaction.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod articles;
pub mod groups;
pub mod line_items;
pub mod orders;
pub mod users;

const SQLITE_DB_URL: &str = "sqlite://data/order_desk.db";

pub fn db_url() -> String {
    let result = env::var("ODS_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ ODS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

/// Opens a connection pool, creating the database file if it does not exist yet. Foreign keys are enforced.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
