//! regressd: stored regression models over HTTP
//!
//! This crate is the process around the service: CLI parsing, layered
//! configuration, logging setup and server bootstrap.

pub mod cli;
pub mod config;
pub mod telemetry;

pub use cli::{build_service, Args};
pub use config::{AppConfig, DatabaseConfig, LoggingConfig, ModelsConfig};
