use chrono::NaiveDate;
use ods_common::{
    serde_helpers::{lenient_opt_u32, lenient_u32},
    Money,
};
use serde::{Deserialize, Serialize};

use crate::db_types::{Article, Order};

//--------------------------------------     Order payloads    ---------------------------------------------------------
/// One line of a new order: a quantity of the article carrying `reference`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub reference: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub amount: u32,
}

impl NewLineItem {
    pub fn new<S: Into<String>>(reference: S, amount: u32) -> Self {
        Self { reference: reference.into(), amount }
    }
}

/// An order as submitted by a client. Any `price` or `tax_price` in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(default)]
    pub articles: Vec<NewLineItem>,
    #[serde(default)]
    pub creation_date: Option<NaiveDate>,
}

impl NewOrder {
    pub fn with_line<S: Into<String>>(mut self, reference: S, amount: u32) -> Self {
        self.articles.push(NewLineItem::new(reference, amount));
        self
    }

    pub fn with_creation_date(mut self, date: NaiveDate) -> Self {
        self.creation_date = Some(date);
        self
    }
}

/// One line of an order update. A line with an `id` changes the amount of that existing line item. A line without
/// one is resolved by `reference` and added as a new line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemUpdate {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub amount: u32,
}

impl LineItemUpdate {
    pub fn existing(id: i64, amount: u32) -> Self {
        Self { id: Some(id), reference: None, amount }
    }

    pub fn new_line<S: Into<String>>(reference: S, amount: u32) -> Self {
        Self { id: None, reference: Some(reference.into()), amount }
    }
}

/// An update to an order. If `articles` is `None` the line items are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(default)]
    pub articles: Option<Vec<LineItemUpdate>>,
    #[serde(default)]
    pub creation_date: Option<NaiveDate>,
}

impl OrderUpdate {
    pub fn with_lines(mut self, lines: Vec<LineItemUpdate>) -> Self {
        self.articles = Some(lines);
        self
    }

    pub fn with_creation_date(mut self, date: NaiveDate) -> Self {
        self.creation_date = Some(date);
        self
    }
}

/// A full replacement of an order. Unlike [`OrderUpdate`], the line items are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceOrder {
    pub articles: Vec<LineItemUpdate>,
    #[serde(default)]
    pub creation_date: Option<NaiveDate>,
}

impl From<ReplaceOrder> for OrderUpdate {
    fn from(order: ReplaceOrder) -> Self {
        Self { articles: Some(order.articles), creation_date: order.creation_date }
    }
}

//--------------------------------------     Order results     ---------------------------------------------------------
/// A line item as nested inside an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub amount: u32,
    pub article: Article,
}

/// An order together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullOrder {
    pub id: i64,
    pub price: Money,
    pub tax_price: Money,
    pub creation_date: NaiveDate,
    pub articles: Vec<OrderLine>,
}

impl FullOrder {
    pub fn new(order: Order, articles: Vec<OrderLine>) -> Self {
        Self { id: order.id, price: order.price, tax_price: order.tax_price, creation_date: order.creation_date, articles }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRejection {
    /// No catalog article carries the reference
    UnknownReference,
    /// More than one catalog article carries the reference
    AmbiguousReference,
    /// A new line was submitted without a reference
    MissingReference,
    /// The line item id does not belong to the order
    UnknownLineItem,
    /// Superseded by a later entry for the same line item id
    DuplicateLineItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineStatus {
    Accepted,
    Rejected { reason: LineRejection },
}

/// What happened to one incoming line of an order create or update, at index `position` of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResult {
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_item_id: Option<i64>,
    #[serde(flatten)]
    pub status: LineStatus,
}

impl LineResult {
    pub fn accepted(position: usize, reference: Option<String>, line_item_id: Option<i64>) -> Self {
        Self { position, reference, line_item_id, status: LineStatus::Accepted }
    }

    pub fn rejected(
        position: usize,
        reference: Option<String>,
        line_item_id: Option<i64>,
        reason: LineRejection,
    ) -> Self {
        Self { position, reference, line_item_id, status: LineStatus::Rejected { reason } }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.status, LineStatus::Accepted)
    }
}

/// The outcome of an order create or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    #[serde(flatten)]
    pub order: FullOrder,
    pub line_results: Vec<LineResult>,
}

//--------------------------------------   Line-item resource  ---------------------------------------------------------
/// A line item addressed on its own, outside of its order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderArticle {
    pub id: i64,
    /// The id of the owning order
    pub order: i64,
    pub amount: u32,
    pub article: Article,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderArticle {
    pub order: i64,
    pub reference: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub amount: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderArticleUpdate {
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    pub amount: Option<u32>,
}

impl From<NewOrderArticle> for OrderArticleUpdate {
    fn from(line: NewOrderArticle) -> Self {
        Self { order: Some(line.order), reference: Some(line.reference), amount: Some(line.amount) }
    }
}

/// A new line item whose article reference has been resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLine {
    pub order_id: i64,
    pub article_id: i64,
    pub amount: u32,
}

/// A resolved change to a line item. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineItemChange {
    pub order_id: Option<i64>,
    pub article_id: Option<i64>,
    pub amount: Option<u32>,
}
