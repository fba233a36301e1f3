use thiserror::Error;

use crate::{
    db_types::{LineItem, ValidationError},
    ode_api::{
        order_objects::{FullOrder, LineItemChange, NewOrder, OrderArticle, OrderResult, OrderUpdate, ResolvedLine},
        reconciliation::ArticleLookup,
    },
    traits::CatalogApiError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Article {0} does not exist")]
    ArticleNotFound(i64),
    #[error("No article has the reference {0}")]
    UnknownReference(String),
    #[error("More than one article has the reference {0}")]
    AmbiguousReference(String),
    #[error("Invalid order data: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

impl From<ValidationError> for OrderFlowError {
    fn from(e: ValidationError) -> Self {
        OrderFlowError::ValidationError(e.0)
    }
}

impl From<CatalogApiError> for OrderFlowError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::DatabaseError(s) => OrderFlowError::DatabaseError(s),
            CatalogApiError::ValidationError(s) => OrderFlowError::ValidationError(s),
        }
    }
}

/// Storage for orders and their line items.
///
/// Every method that changes the set of line items of an order, or their amounts, also recomputes and stores that
/// order's `price` and `tax_price` in the same transaction. Callers never see stale totals.
///
/// Order payloads refer to articles by reference. The caller resolves those references up front into an
/// [`ArticleLookup`]; the backend plans the line-item changes against it with [`crate::ode_api::reconciliation`].
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// All orders with their line items, ordered by creation date.
    async fn fetch_orders(&self) -> Result<Vec<FullOrder>, OrderFlowError>;

    async fn fetch_order(&self, id: i64) -> Result<Option<FullOrder>, OrderFlowError>;

    /// The bare line items of an order, without article data.
    async fn fetch_line_items(&self, order_id: i64) -> Result<Vec<LineItem>, OrderFlowError>;

    /// Creates an order with the line items that resolve against `lookup`. Lines that do not resolve are reported in
    /// the result and otherwise ignored. `order.creation_date` must be set by the caller.
    async fn insert_order(&self, order: NewOrder, lookup: &ArticleLookup) -> Result<OrderResult, OrderFlowError>;

    /// Reconciles the order's line items against the update, if it carries any, and replaces the creation date if
    /// one is given. Returns `None` if the order does not exist.
    async fn update_order(
        &self,
        id: i64,
        update: OrderUpdate,
        lookup: &ArticleLookup,
    ) -> Result<Option<OrderResult>, OrderFlowError>;

    /// Deletes the order together with its line items.
    async fn delete_order(&self, id: i64) -> Result<bool, OrderFlowError>;

    /// All line items across all orders, ordered by amount.
    async fn fetch_order_articles(&self) -> Result<Vec<OrderArticle>, OrderFlowError>;

    async fn fetch_order_article(&self, id: i64) -> Result<Option<OrderArticle>, OrderFlowError>;

    /// Adds one line item to an existing order. Fails with [`OrderFlowError::OrderNotFound`] if the order is missing.
    async fn insert_order_article(&self, line: ResolvedLine) -> Result<OrderArticle, OrderFlowError>;

    /// Changes a line item. If the line moves to a different order, both orders' totals are recomputed.
    async fn update_order_article(
        &self,
        id: i64,
        change: LineItemChange,
    ) -> Result<Option<OrderArticle>, OrderFlowError>;

    async fn delete_order_article(&self, id: i64) -> Result<bool, OrderFlowError>;
}
