use thiserror::Error;

use crate::db_types::{Article, ArticleUpdate, NewArticle, ValidationError};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid article: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

impl From<ValidationError> for CatalogApiError {
    fn from(e: ValidationError) -> Self {
        CatalogApiError::ValidationError(e.0)
    }
}

/// Storage for catalog articles.
///
/// Changing the price or tax of an article changes the totals of every order containing it, so implementations of
/// [`update_article`](CatalogManagement::update_article) and [`delete_article`](CatalogManagement::delete_article)
/// must recompute those orders' totals in the same transaction.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// All articles, ordered by name.
    async fn fetch_articles(&self) -> Result<Vec<Article>, CatalogApiError>;

    async fn fetch_article(&self, id: i64) -> Result<Option<Article>, CatalogApiError>;

    /// All articles carrying the given reference. References are not unique, so this may return more than one.
    async fn fetch_articles_by_reference(&self, reference: &str) -> Result<Vec<Article>, CatalogApiError>;

    /// Stores a new article. The caller validates it. If it carries no creation date, today is used.
    async fn insert_article(&self, article: NewArticle) -> Result<Article, CatalogApiError>;

    /// Applies the update to the article with the given id. Returns `None` if no such article exists.
    async fn update_article(&self, id: i64, update: ArticleUpdate) -> Result<Option<Article>, CatalogApiError>;

    /// Deletes the article and every line item that refers to it. Returns `false` if no such article exists.
    async fn delete_article(&self, id: i64) -> Result<bool, CatalogApiError>;
}
