//! CLI module
//!
//! Provides:
//! - Argument parsing
//! - Service bootstrap (store, registry, server) from configuration

pub mod args;
pub mod bootstrap;

// Re-exports
pub use args::Args;
pub use bootstrap::{build_service, open_store, run};

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Database error: {0}")]
    Database(#[from] regressd_databases::StoreError),
}

/// Exit codes (deterministic)
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;
