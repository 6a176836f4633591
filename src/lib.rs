//! # Glider
//!
//! A synchronous SQL access layer: a fluent query builder that writes SQL
//! with named placeholders, a parameter bag, a generator that rewrites the
//! text to positional markers, typed binding, transactional execution and
//! result mapping into collections.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glider::prelude::*;
//!
//! fn main() -> Result<(), GliderError> {
//!     let glider = Glider::from_env()?;
//!     let mut platform = glider.connect_default()?;
//!
//!     QueryBuilder::new(&mut platform)
//!         .insert("users", [("name", Value::from("Ann")), ("age", Value::from(30))])?;
//!
//!     let users = QueryBuilder::new(&mut platform)
//!         .select(&["id", "name"])
//!         .from("users")
//!         .where_("age", 30)
//!         .get()?;
//!
//!     println!("{}", users.to_json());
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use crate::core::Glider;
pub use errors::GliderError;

// Re-export centralized config
pub use config::{AppConfig, ConnectionProfile};

// Re-export internal crates used by the public API
pub use platform;
pub use query_core;
pub use type_mapping;
