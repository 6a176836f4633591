//! Connector registry
//!
//! Maps backend identifiers to connectors and resolves connection profiles
//! into platforms.

use crate::connection::Connector;
use crate::errors::PlatformError;
use crate::platform::Platform;
use crate::sqlx_backend::SqlxConnector;
use config::AppConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of available backends
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the sqlx-backed `mysql` and `sqlite` connectors
    pub fn with_defaults() -> Self {
        Self::new()
            .with_connector(SqlxConnector::mysql())
            .with_connector(SqlxConnector::sqlite())
    }

    /// Register a connector, replacing any connector for the same backend
    pub fn with_connector<C: Connector + 'static>(mut self, connector: C) -> Self {
        self.register(Arc::new(connector));
        self
    }

    pub fn register(&mut self, connector: Arc<dyn Connector>) {
        self.connectors
            .insert(connector.backend().to_ascii_lowercase(), connector);
    }

    pub fn contains(&self, backend: &str) -> bool {
        self.connectors.contains_key(&backend.to_ascii_lowercase())
    }

    /// Registered backend identifiers, sorted
    pub fn backends(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.connectors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve the named profile into a connected platform.
    ///
    /// When no connector is registered for the profile's backend, the
    /// profile's fallback chain is followed. Connection failures of a
    /// registered backend are returned as-is.
    pub fn resolve(&self, config: &AppConfig, profile_name: &str) -> Result<Platform, PlatformError> {
        let requested = config
            .profile(profile_name)
            .map_err(|_| PlatformError::ProfileNotFound(profile_name.to_string()))?;

        let mut visited = vec![profile_name.to_string()];
        let mut current_name = profile_name.to_string();
        let mut current = requested;

        loop {
            if let Some(connector) = self.connectors.get(&current.backend.to_ascii_lowercase()) {
                debug!(
                    profile = %current_name,
                    backend = %current.backend,
                    auto_commit = current.auto_commit,
                    "Resolving connection profile"
                );
                let connection = connector.connect(current)?;
                return Ok(Platform::new(
                    current_name,
                    current.backend.clone(),
                    current.auto_commit,
                    connector.dialect(),
                    connection,
                ));
            }

            let next = match current.fallback.as_deref() {
                Some(alt) if !visited.iter().any(|v| v == alt) => alt.to_string(),
                _ => {
                    return Err(PlatformError::NoBackend {
                        profile: profile_name.to_string(),
                        backend: requested.backend.clone(),
                    });
                }
            };

            warn!(
                profile = %current_name,
                backend = %current.backend,
                fallback = %next,
                "No backend registered, falling back to alternate profile"
            );

            current = config
                .profile(&next)
                .map_err(|_| PlatformError::ProfileNotFound(next.clone()))?;
            visited.push(next.clone());
            current_name = next;
        }
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("backends", &self.backends())
            .finish()
    }
}
