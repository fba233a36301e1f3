//! # Order Desk engine public API
//!
//! Each API object wraps a storage backend that implements the traits it needs from [`crate::traits`], and adds the
//! business rules on top.
//!
//! * [`catalog_api`] manages catalog articles.
//! * [`order_flow_api`] creates and reconciles orders, and manages individual line items.
//! * [`accounts_api`] manages users and groups.
//! * [`auth_api`] checks credentials and assigns roles.
//!
//! ```rust,ignore
//! use order_desk_engine::{CatalogApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/order_desk.db", 25).await?;
//! let api = CatalogApi::new(db);
//! let articles = api.articles().await?;
//! ```
pub mod accounts_api;
pub mod auth_api;
pub mod catalog_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod reconciliation;
