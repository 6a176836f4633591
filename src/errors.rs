//! Error types for the Glider crate
//!
//! Every member crate error converts into [`GliderError`], so application
//! code can use `?` across configuration, connection and query calls.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GliderError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] platform::PlatformError),

    #[error("Query error: {0}")]
    Query(#[from] query_core::QueryError),
}
