use std::fmt::Debug;

use chrono::Local;
use log::*;

use crate::{
    db_types::{Article, ArticleUpdate, NewArticle},
    traits::{CatalogApiError, CatalogManagement},
};

/// `CatalogApi` validates article data and fills in defaults before handing it to the backend.
pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn articles(&self) -> Result<Vec<Article>, CatalogApiError> {
        self.db.fetch_articles().await
    }

    pub async fn article(&self, id: i64) -> Result<Option<Article>, CatalogApiError> {
        self.db.fetch_article(id).await
    }

    /// Stores a new article. If no creation date is given, today's date is used.
    pub async fn create_article(&self, mut article: NewArticle) -> Result<Article, CatalogApiError> {
        article.validate()?;
        if article.creation_date.is_none() {
            article.creation_date = Some(Local::now().date_naive());
        }
        let article = self.db.insert_article(article).await?;
        debug!("🏷️ Article #{} ({}) added to the catalog", article.id, article.reference);
        Ok(article)
    }

    /// Replaces every field of an article. The stored creation date is kept if none is given.
    pub async fn replace_article(&self, id: i64, article: NewArticle) -> Result<Option<Article>, CatalogApiError> {
        article.validate()?;
        self.update_article(id, ArticleUpdate::from(article)).await
    }

    pub async fn update_article(&self, id: i64, update: ArticleUpdate) -> Result<Option<Article>, CatalogApiError> {
        update.validate()?;
        let result = self.db.update_article(id, update).await?;
        match &result {
            Some(_) => debug!("🏷️ Article #{id} updated"),
            None => debug!("🏷️ Article #{id} cannot be updated because it does not exist"),
        }
        Ok(result)
    }

    pub async fn delete_article(&self, id: i64) -> Result<bool, CatalogApiError> {
        let deleted = self.db.delete_article(id).await?;
        if deleted {
            info!("🏷️ Article #{id} removed from the catalog");
        }
        Ok(deleted)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
