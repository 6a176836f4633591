//! Platform - backend capability layer for Glider
//!
//! This crate defines the synchronous contract a database backend must
//! fulfil (connect, transactions, prepared execution, result description),
//! the [`Platform`] a query builder is bound to, and the
//! [`ConnectorRegistry`] that resolves a named connection profile into a
//! live platform, following the profile's fallback when its backend is not
//! available.

pub mod connection;
pub mod dialect;
pub mod errors;
pub mod platform;
pub mod registry;
pub mod sql_text;
pub mod sqlx_backend;

pub use connection::{BoundParameter, Connection, Connector, PreparedStatement, ResultSet};
pub use dialect::Dialect;
pub use errors::{BackendError, PlatformError};
pub use platform::{Platform, Transaction};
pub use registry::ConnectorRegistry;
pub use sqlx_backend::{SqlxConnection, SqlxConnector};
