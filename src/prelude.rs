//! Convenience re-exports for common Glider usage
//!
//! # Example
//!
//! ```rust
//! use glider::prelude::*;
//!
//! let profile = ConnectionProfile::new("sqlite", "sqlite::memory:");
//! let glider = Glider::new(AppConfig::single("default", profile)).unwrap();
//! assert!(glider.registry().contains("sqlite"));
//! ```

// Core Glider components
pub use crate::core::Glider;
pub use crate::errors::GliderError;

// Re-export centralized config
pub use config::{AppConfig, ConnectionProfile};

// Platform layer
pub use platform::{Connection, Connector, ConnectorRegistry, Dialect, Platform};

// Query building and results
pub use query_core::prelude::*;
