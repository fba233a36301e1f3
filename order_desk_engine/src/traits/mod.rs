//! # Backend contracts
//!
//! The traits in this module define what a storage backend must provide to support the Order Desk engine.
//!
//! * [`CatalogManagement`] stores and retrieves catalog articles.
//! * [`OrderManagement`] stores orders and their line items, and keeps order totals consistent with them.
//! * [`AccountManagement`] manages users and groups.
//! * [`AuthManagement`] exposes the stored credentials used to issue access tokens.
//!
//! The API objects in [`crate::ode_api`] wrap a backend and add the business rules (validation, default values and
//! reconciliation) on top of these primitives.
mod account_management;
mod auth_management;
mod catalog_management;
mod order_management;

pub use account_management::{AccountApiError, AccountManagement};
pub use auth_management::{AuthApiError, AuthManagement};
pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use order_management::{OrderFlowError, OrderManagement};

/// True if the error is a violation of a `UNIQUE` constraint.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
