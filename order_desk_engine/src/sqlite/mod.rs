//! SQLite backend for the Order Desk engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
