use chrono::NaiveDate;
use log::trace;
use ods_common::Money;
use sqlx::SqliteConnection;

use super::line_items;
use crate::{db_types::Order, ode_api::reconciliation::compute_totals};

/// All order headers, oldest first.
pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders ORDER BY creation_date, id").fetch_all(conn).await
}

pub async fn fetch_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// Inserts an empty order. The totals start at zero.
pub async fn insert(creation_date: NaiveDate, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    sqlx::query_as("INSERT INTO orders (price, tax_price, creation_date) VALUES (0, 0, $1) RETURNING *")
        .bind(creation_date)
        .fetch_one(conn)
        .await
}

pub async fn set_creation_date(id: i64, date: NaiveDate, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE orders SET creation_date = $1 WHERE id = $2").bind(date).bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Recomputes the order's totals from its current line items and stores them.
pub async fn recompute_totals(id: i64, conn: &mut SqliteConnection) -> Result<(Money, Money), sqlx::Error> {
    let lines = line_items::fetch_lines_for_order(id, &mut *conn).await?;
    let (price, tax_price) = compute_totals(&lines);
    sqlx::query("UPDATE orders SET price = $1, tax_price = $2 WHERE id = $3")
        .bind(price)
        .bind(tax_price)
        .bind(id)
        .execute(conn)
        .await?;
    trace!("🗃️ Order #{id} totals recomputed over {} lines: {price} / {tax_price}", lines.len());
    Ok((price, tax_price))
}
