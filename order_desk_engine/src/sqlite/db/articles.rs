use chrono::NaiveDate;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{Article, ArticleUpdate, NewArticle};

pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<Article>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM articles ORDER BY name, id").fetch_all(conn).await
}

pub async fn fetch_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Article>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM articles WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_by_reference(reference: &str, conn: &mut SqliteConnection) -> Result<Vec<Article>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM articles WHERE reference = $1 ORDER BY id").bind(reference).fetch_all(conn).await
}

pub async fn insert(
    article: NewArticle,
    creation_date: NaiveDate,
    conn: &mut SqliteConnection,
) -> Result<Article, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO articles (reference, name, description, price, tax, creation_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(article.reference)
    .bind(article.name)
    .bind(article.description)
    .bind(article.price)
    .bind(article.tax)
    .bind(creation_date)
    .fetch_one(conn)
    .await
}

/// Applies the non-empty fields of `update`. Returns `None` if the article does not exist.
pub async fn update(
    id: i64,
    update: ArticleUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Article>, sqlx::Error> {
    if update.is_empty() {
        return fetch_by_id(id, conn).await;
    }
    let mut builder = QueryBuilder::new("UPDATE articles SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(reference) = update.reference {
        set_clause.push("reference = ");
        set_clause.push_bind_unseparated(reference);
    }
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(tax) = update.tax {
        set_clause.push("tax = ");
        set_clause.push_bind_unseparated(tax);
    }
    if let Some(date) = update.creation_date {
        set_clause.push("creation_date = ");
        set_clause.push_bind_unseparated(date);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    builder.build_query_as::<Article>().fetch_optional(conn).await
}

pub async fn delete(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM articles WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Ids of the orders that have at least one line item for the article.
pub async fn orders_containing(article_id: i64, conn: &mut SqliteConnection) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT DISTINCT order_id FROM order_articles WHERE article_id = $1 ORDER BY order_id")
        .bind(article_id)
        .fetch_all(conn)
        .await
}
