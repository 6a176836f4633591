//! Core Glider functionality
//!
//! [`Glider`] ties the connection profiles to the registered backends and
//! hands out connected platforms for query builders to run against.

use std::sync::Arc;

use crate::errors::GliderError;
use config::AppConfig;
use platform::{Connector, ConnectorRegistry, Platform};

/// Coordinator owning the configuration and the backend registry
#[derive(Debug, Clone)]
pub struct Glider {
    config: AppConfig,
    registry: ConnectorRegistry,
}

impl Glider {
    /// Coordinator over `config` with the built-in mysql and sqlite backends
    pub fn new(config: AppConfig) -> Result<Self, GliderError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: ConnectorRegistry::with_defaults(),
        })
    }

    /// Coordinator over the configuration found by [`AppConfig::load`]
    pub fn from_env() -> Result<Self, GliderError> {
        Self::new(AppConfig::load()?)
    }

    /// Replace the backend registry
    pub fn with_registry(mut self, registry: ConnectorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register an additional backend, replacing any with the same identifier
    pub fn with_connector<C: Connector + 'static>(mut self, connector: C) -> Self {
        self.registry.register(Arc::new(connector));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    /// Connect the named profile, following its fallback chain when its
    /// backend is not registered
    pub fn connect(&self, profile: &str) -> Result<Platform, GliderError> {
        crate::debug_log!(profile = %profile, "Connecting profile");
        let platform = self.registry.resolve(&self.config, profile)?;
        crate::trace_log!(
            profile = %platform.profile_name(),
            backend = %platform.name(),
            "Platform ready"
        );
        Ok(platform)
    }

    /// Connect the profile named by the configuration's `default`
    pub fn connect_default(&self) -> Result<Platform, GliderError> {
        self.connect(&self.config.default)
    }
}
