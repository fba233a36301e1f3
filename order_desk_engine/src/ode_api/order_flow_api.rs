use std::{collections::BTreeSet, fmt::Debug};

use chrono::Local;
use log::*;

use crate::{
    db_types::Article,
    ode_api::{
        order_objects::{
            FullOrder,
            LineItemChange,
            NewOrder,
            NewOrderArticle,
            OrderArticle,
            OrderArticleUpdate,
            OrderResult,
            OrderUpdate,
            ReplaceOrder,
            ResolvedLine,
        },
        reconciliation::ArticleLookup,
    },
    traits::{CatalogManagement, OrderFlowError, OrderManagement},
};

/// `OrderFlowApi` handles order creation and reconciliation, and direct management of line items.
///
/// Incoming lines refer to articles by reference. The API resolves those against the catalog before handing the
/// order to the backend. Lines that cannot be resolved are reported in [`OrderResult::line_results`] and otherwise
/// skipped.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement + CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn orders(&self) -> Result<Vec<FullOrder>, OrderFlowError> {
        self.db.fetch_orders().await
    }

    pub async fn order(&self, id: i64) -> Result<Option<FullOrder>, OrderFlowError> {
        self.db.fetch_order(id).await
    }

    async fn lookup_for<'a, I>(&self, references: I) -> Result<ArticleLookup, OrderFlowError>
    where I: IntoIterator<Item = &'a str> {
        let references = references.into_iter().collect::<BTreeSet<&str>>();
        let mut articles = Vec::new();
        for reference in references {
            articles.extend(self.db.fetch_articles_by_reference(reference).await?);
        }
        Ok(ArticleLookup::new(articles))
    }

    /// Creates a new order. If no creation date is given, today's date is used.
    pub async fn create_order(&self, mut order: NewOrder) -> Result<OrderResult, OrderFlowError> {
        if order.creation_date.is_none() {
            order.creation_date = Some(Local::now().date_naive());
        }
        let lookup = self.lookup_for(order.articles.iter().map(|l| l.reference.as_str())).await?;
        let result = self.db.insert_order(order, &lookup).await?;
        debug!(
            "📦️ Order #{} created with {} line items. Total {} ({} incl. tax)",
            result.order.id,
            result.order.articles.len(),
            result.order.price,
            result.order.tax_price
        );
        Ok(result)
    }

    /// Reconciles an order with a full set of line items.
    pub async fn replace_order(&self, id: i64, order: ReplaceOrder) -> Result<Option<OrderResult>, OrderFlowError> {
        self.update_order(id, OrderUpdate::from(order)).await
    }

    /// Applies a partial update. The line items are reconciled only if the update carries them.
    pub async fn update_order(&self, id: i64, update: OrderUpdate) -> Result<Option<OrderResult>, OrderFlowError> {
        let new_refs = update
            .articles
            .iter()
            .flatten()
            .filter(|l| l.id.is_none())
            .filter_map(|l| l.reference.as_deref())
            .collect::<Vec<&str>>();
        let lookup = self.lookup_for(new_refs).await?;
        let result = self.db.update_order(id, update, &lookup).await?;
        match &result {
            Some(r) => debug!(
                "📦️ Order #{id} updated. It now has {} line items, totalling {} ({} incl. tax)",
                r.order.articles.len(),
                r.order.price,
                r.order.tax_price
            ),
            None => debug!("📦️ Order #{id} cannot be updated because it does not exist"),
        }
        Ok(result)
    }

    pub async fn delete_order(&self, id: i64) -> Result<bool, OrderFlowError> {
        let deleted = self.db.delete_order(id).await?;
        if deleted {
            info!("📦️ Order #{id} and its line items have been deleted");
        }
        Ok(deleted)
    }

    pub async fn order_articles(&self) -> Result<Vec<OrderArticle>, OrderFlowError> {
        self.db.fetch_order_articles().await
    }

    pub async fn order_article(&self, id: i64) -> Result<Option<OrderArticle>, OrderFlowError> {
        self.db.fetch_order_article(id).await
    }

    /// Unlike order payloads, a line item addressed directly must name exactly one catalog article.
    async fn resolve_reference(&self, reference: &str) -> Result<Article, OrderFlowError> {
        let mut articles = self.db.fetch_articles_by_reference(reference).await?;
        match articles.len() {
            0 => Err(OrderFlowError::UnknownReference(reference.to_string())),
            1 => Ok(articles.remove(0)),
            _ => Err(OrderFlowError::AmbiguousReference(reference.to_string())),
        }
    }

    pub async fn create_order_article(&self, line: NewOrderArticle) -> Result<OrderArticle, OrderFlowError> {
        let article = self.resolve_reference(&line.reference).await?;
        let resolved = ResolvedLine { order_id: line.order, article_id: article.id, amount: line.amount };
        let line = self.db.insert_order_article(resolved).await?;
        debug!("📦️ Line item #{} added to order #{}", line.id, line.order);
        Ok(line)
    }

    pub async fn replace_order_article(
        &self,
        id: i64,
        line: NewOrderArticle,
    ) -> Result<Option<OrderArticle>, OrderFlowError> {
        self.update_order_article(id, OrderArticleUpdate::from(line)).await
    }

    pub async fn update_order_article(
        &self,
        id: i64,
        update: OrderArticleUpdate,
    ) -> Result<Option<OrderArticle>, OrderFlowError> {
        let article_id = match &update.reference {
            Some(reference) => Some(self.resolve_reference(reference).await?.id),
            None => None,
        };
        let change = LineItemChange { order_id: update.order, article_id, amount: update.amount };
        let result = self.db.update_order_article(id, change).await?;
        if result.is_some() {
            debug!("📦️ Line item #{id} updated");
        }
        Ok(result)
    }

    pub async fn delete_order_article(&self, id: i64) -> Result<bool, OrderFlowError> {
        self.db.delete_order_article(id).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
