//! # Connection Configuration for Glider
//!
//! This crate holds the named connection profiles a platform is resolved
//! from. Each profile names a backend, its credentials, its autocommit mode
//! and, optionally, another profile to fall back to when the backend of the
//! primary one cannot be resolved.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{AppConfig, ConnectionProfile};
//!
//! let profile = ConnectionProfile::new("sqlite", "sqlite::memory:").with_auto_commit(false);
//! let config = AppConfig::single("default", profile);
//! assert_eq!(config.default_profile().unwrap().backend, "sqlite");
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! default = "primary"
//!
//! [connections.primary]
//! backend = "mysql"
//! host = "localhost"
//! port = 3306
//! username = "root"
//! password = "root"
//! database = "service_finder_app"
//! charset = "utf8"
//! auto_commit = false
//! fallback = "dev"
//!
//! [connections.dev]
//! backend = "sqlite"
//! database = "sqlite::memory:"
//! auto_commit = true
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from glider.toml (or the path in GLIDER_CONFIG)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./glider.toml";
const CONFIG_PATH_VAR: &str = "GLIDER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Connection profile not found: {0}")]
    ProfileNotFound(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete connection configuration: a set of named profiles and the name
/// of the one used when no profile is requested explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub default: String,
    pub connections: BTreeMap<String, ConnectionProfile>,
}

/// A single named connection profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Backend identifier the connector registry resolves (`mysql`, `sqlite`, ...)
    pub backend: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub charset: String,
    #[serde(default)]
    pub collation: String,
    #[serde(default = "default_auto_commit")]
    pub auto_commit: bool,
    #[serde(default)]
    pub prefix: String,
    /// Profile to use when this profile's backend cannot be resolved
    #[serde(default)]
    pub fallback: Option<String>,
}

fn default_auto_commit() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from the TOML file named in `.env`/`GLIDER_CONFIG`,
    /// or from `./glider.toml`
    pub fn load() -> Result<Self, ConfigError> {
        let config = {
            // A missing .env file is not an error; the default path still applies
            if let Err(err) = dotenvy::dotenv() {
                if !err.not_found() {
                    return Err(err.into());
                }
            }

            if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
                Self::from_file(&config_path)
            } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
                Self::from_file(DEFAULT_CONFIG_PATH)
            } else {
                Err(ConfigError::Invalid(format!(
                    "Config path must be specified in .env file as {} or in {} file",
                    CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
                )))
            }
        }?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration holding exactly one profile, which is also the default
    pub fn single(name: impl Into<String>, profile: ConnectionProfile) -> Self {
        let name = name.into();
        let mut connections = BTreeMap::new();
        connections.insert(name.clone(), profile);
        Self {
            default: name,
            connections,
        }
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&ConnectionProfile, ConfigError> {
        self.connections
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }

    /// The profile named by `default`
    pub fn default_profile(&self) -> Result<&ConnectionProfile, ConfigError> {
        self.profile(&self.default)
    }

    /// Name and profile of the fallback configured for `name`, if any
    pub fn fallback_of(&self, name: &str) -> Result<Option<(&str, &ConnectionProfile)>, ConfigError> {
        let profile = self.profile(name)?;
        match profile.fallback.as_deref() {
            Some(alt) => Ok(Some((alt, self.profile(alt)?))),
            None => Ok(None),
        }
    }

    /// Insert or replace a profile
    pub fn with_profile(mut self, name: impl Into<String>, profile: ConnectionProfile) -> Self {
        self.connections.insert(name.into(), profile);
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default.is_empty() {
            return Err(ConfigError::Invalid(
                "Default profile name cannot be empty".to_string(),
            ));
        }
        if !self.connections.contains_key(&self.default) {
            return Err(ConfigError::Invalid(format!(
                "Default profile '{}' is not defined",
                self.default
            )));
        }

        for (name, profile) in &self.connections {
            if profile.backend.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Profile '{}': backend cannot be empty",
                    name
                )));
            }
            if profile.database.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Profile '{}': database cannot be empty",
                    name
                )));
            }
            if let Some(alt) = &profile.fallback {
                if alt == name {
                    return Err(ConfigError::Invalid(format!(
                        "Profile '{}' cannot fall back to itself",
                        name
                    )));
                }
                if !self.connections.contains_key(alt) {
                    return Err(ConfigError::Invalid(format!(
                        "Profile '{}': fallback profile '{}' is not defined",
                        name, alt
                    )));
                }
            }
        }

        Ok(())
    }
}

impl ConnectionProfile {
    /// Create a profile with only a backend and database; everything else defaults
    pub fn new(backend: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            host: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            database: database.into(),
            charset: String::new(),
            collation: String::new(),
            auto_commit: true,
            prefix: String::new(),
            fallback: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_auto_commit(mut self, auto_commit: bool) -> Self {
        self.auto_commit = auto_commit;
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Build connection string.
    ///
    /// SQLite profiles use `database` verbatim when it already is a URL
    /// (`sqlite::memory:`), otherwise as a file path.
    pub fn connection_url(&self) -> String {
        match self.backend.as_str() {
            "sqlite" => {
                if self.database.starts_with("sqlite:") {
                    self.database.clone()
                } else {
                    format!("sqlite://{}", self.database)
                }
            }
            scheme => {
                let mut url = format!(
                    "{}://{}:{}@{}:{}/{}",
                    scheme, self.username, self.password, self.host, self.port, self.database
                );
                if !self.charset.is_empty() {
                    url.push_str("?charset=");
                    url.push_str(&self.charset);
                }
                url
            }
        }
    }
}
