//! regressd server entry point
//!
//! Configuration precedence: defaults, `--config` file, `REGRESSD__*`
//! environment, CLI flags.

use clap::Parser;

use regressd::cli::{self, Args, EXIT_CONFIG_ERROR, EXIT_FAILURE};
use regressd::{telemetry, AppConfig};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };
    config.apply_args(&args);
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_CONFIG_ERROR);
    }

    if let Err(e) = telemetry::init_tracing(&config.logging) {
        eprintln!("Error: {:#}", e);
        std::process::exit(EXIT_FAILURE);
    }

    if let Err(e) = cli::run(config).await {
        tracing::error!("regressd exited with error: {:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}
