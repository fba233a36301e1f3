use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Article, LineItem},
    ode_api::order_objects::{LineItemChange, OrderArticle, OrderLine},
};

const LINE_QUERY: &str = r#"
    SELECT oa.id AS line_id, oa.order_id, oa.amount, a.*
    FROM order_articles oa JOIN articles a ON a.id = oa.article_id
"#;

/// A line item joined with its article
#[derive(Debug, Clone, FromRow)]
pub struct LineRow {
    pub line_id: i64,
    pub order_id: i64,
    pub amount: u32,
    #[sqlx(flatten)]
    pub article: Article,
}

impl From<LineRow> for OrderLine {
    fn from(row: LineRow) -> Self {
        Self { id: row.line_id, amount: row.amount, article: row.article }
    }
}

impl From<LineRow> for OrderArticle {
    fn from(row: LineRow) -> Self {
        Self { id: row.line_id, order: row.order_id, amount: row.amount, article: row.article }
    }
}

pub async fn fetch_lines_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    let rows: Vec<LineRow> = sqlx::query_as(&format!("{LINE_QUERY} WHERE oa.order_id = $1 ORDER BY oa.id"))
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(OrderLine::from).collect())
}

/// Every line item in the database, in insertion order.
pub async fn fetch_all_rows(conn: &mut SqliteConnection) -> Result<Vec<LineRow>, sqlx::Error> {
    let query = format!("{LINE_QUERY} ORDER BY oa.id");
    sqlx::query_as(&query).fetch_all(conn).await
}

/// Every line item in the database, smallest amount first.
pub async fn fetch_all_by_amount(conn: &mut SqliteConnection) -> Result<Vec<OrderArticle>, sqlx::Error> {
    let rows: Vec<LineRow> =
        sqlx::query_as(&format!("{LINE_QUERY} ORDER BY oa.amount, oa.id")).fetch_all(conn).await?;
    Ok(rows.into_iter().map(OrderArticle::from).collect())
}

pub async fn fetch_row(id: i64, conn: &mut SqliteConnection) -> Result<Option<LineRow>, sqlx::Error> {
    let query = format!("{LINE_QUERY} WHERE oa.id = $1");
    sqlx::query_as(&query).bind(id).fetch_optional(conn).await
}

pub async fn fetch_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<LineItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_articles WHERE order_id = $1 ORDER BY id").bind(order_id).fetch_all(conn).await
}

pub async fn fetch_item(id: i64, conn: &mut SqliteConnection) -> Result<Option<LineItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_articles WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// Inserts a line item, returning its id.
pub async fn insert(
    order_id: i64,
    article_id: i64,
    amount: u32,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("INSERT INTO order_articles (order_id, article_id, amount) VALUES ($1, $2, $3) RETURNING id")
        .bind(order_id)
        .bind(article_id)
        .bind(amount)
        .fetch_one(conn)
        .await
}

pub async fn set_amount(id: i64, amount: u32, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE order_articles SET amount = $1 WHERE id = $2").bind(amount).bind(id).execute(conn).await?;
    Ok(())
}

pub async fn update(id: i64, change: LineItemChange, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    if change == LineItemChange::default() {
        return Ok(());
    }
    let mut builder = QueryBuilder::new("UPDATE order_articles SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(order_id) = change.order_id {
        set_clause.push("order_id = ");
        set_clause.push_bind_unseparated(order_id);
    }
    if let Some(article_id) = change.article_id {
        set_clause.push("article_id = ");
        set_clause.push_bind_unseparated(article_id);
    }
    if let Some(amount) = change.amount {
        set_clause.push("amount = ");
        set_clause.push_bind_unseparated(amount);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.build().execute(conn).await?;
    Ok(())
}

pub async fn delete(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM order_articles WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
