//! CLI argument parsing
//!
//! Every flag is optional and overrides the matching configuration value.

use clap::Parser;
use std::path::PathBuf;

/// Parsed CLI arguments
#[derive(Debug, Clone, PartialEq, Default, Parser)]
#[command(name = "regressd", version, about = "Train, query and manage stored regression models")]
pub struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Keep regressions in memory only
    #[arg(long)]
    pub in_memory: bool,

    /// Log filter, e.g. `info` or `regressd_core=debug`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}
