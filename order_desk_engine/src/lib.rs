//! Order Desk Engine
//!
//! The Order Desk engine holds the core logic of a small order-management backend: a catalog of priced, taxable
//! articles, and orders that refer to those articles by reference and quantity. The engine computes order totals and
//! reconciles the line items of an existing order against an update.
//!
//! The library is divided into three main sections:
//! 1. The backend contracts ([`mod@traits`]) and the SQLite backend that implements them ([`SqliteDatabase`]). You
//!    should never need to access the database directly. The exception is the data types used in the database, which
//!    are defined in the [`db_types`] module and are public.
//! 2. The public API ([`mod@ode_api`]): catalog, orders, accounts and authentication. Each API object wraps a backend
//!    that implements the traits it needs.
//! 3. The reconciliation planner ([`ode_api::reconciliation`]), a pure function of the incoming lines, the order's
//!    current lines, and the catalog.
pub mod db_types;
pub mod helpers;
pub mod ode_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use ode_api::{
    accounts_api::AccountApi,
    auth_api::{AuthApi, AuthenticatedUser},
    catalog_api::CatalogApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    reconciliation,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use traits::{
    AccountApiError,
    AccountManagement,
    AuthApiError,
    AuthManagement,
    CatalogApiError,
    CatalogManagement,
    OrderFlowError,
    OrderManagement,
};
