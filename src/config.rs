//! Configuration Management Module
//!
//! Layers, lowest to highest precedence: built-in defaults, an optional
//! configuration file, `REGRESSD__*` environment variables, CLI flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use regressd_api::ApiConfig;
use regressd_core::{ModelRegistry, DEFAULT_CLASSES};

use crate::cli::{Args, Error, Result};

/// Environment variable prefix, e.g. `REGRESSD__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "REGRESSD";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ApiConfig,
    /// Model store settings
    pub database: DatabaseConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Model class allow-list
    pub models: ModelsConfig,
}

/// Model store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file
    pub path: PathBuf,
    /// Ignore `path` and keep everything in memory
    pub in_memory: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/regressd.db"),
            in_memory: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive; `RUST_LOG` takes precedence when set
    pub level: String,
    /// JSON output instead of human-readable lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Model class configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Classes that may be trained
    pub enabled: Vec<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load from `path` (if given) and `REGRESSD__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Load using a custom environment prefix
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("models.enabled"),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Apply CLI overrides
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(path) = &args.database {
            self.database.path = path.clone();
        }
        if args.in_memory {
            self.database.in_memory = true;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if args.json_logs {
            self.logging.json = true;
        }
    }

    /// Check values the deserializer cannot
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::InvalidConfig("server.host must not be empty".to_string()));
        }
        if self.models.enabled.is_empty() {
            return Err(Error::InvalidConfig(
                "models.enabled must list at least one model class".to_string(),
            ));
        }
        self.registry()?;
        EnvFilter::try_new(&self.logging.level).map_err(|e| {
            Error::InvalidConfig(format!("invalid logging.level '{}': {e}", self.logging.level))
        })?;
        Ok(())
    }

    /// Registry restricted to `models.enabled`
    pub fn registry(&self) -> Result<ModelRegistry> {
        ModelRegistry::allow_only(self.models.enabled.as_slice())
            .map_err(|e| Error::InvalidConfig(format!("models.enabled: {e}")))
    }
}
