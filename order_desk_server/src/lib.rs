//! # Order Desk server
//! This crate hosts the HTTP server for the Order Desk. It is responsible for:
//! * Issuing access tokens to local users and checking them, and the roles they carry, on every other request.
//! * Parsing request bodies and handing them to the engine APIs in [`order_desk_engine`].
//! * Turning engine results into hyperlinked JSON resources, and engine errors into HTTP status codes.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/auth`: Exchanges a username and password for an access token.
//! * `/articles`, `/orders`, `/order-articles`: The catalog and orders. Any authenticated user may use these.
//! * `/users`, `/groups`: Account administration. These require the `admin` role.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
