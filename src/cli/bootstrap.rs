//! Service bootstrap
//!
//! Turns an [`AppConfig`] into a running server: opens the model store,
//! builds the model-class registry, wires the service into the API.

use std::sync::Arc;
use tracing::info;

use regressd_api::ApiServer;
use regressd_core::RegressionService;
use regressd_databases::{ModelStore, SqliteModelStore};

use crate::cli::Result;
use crate::config::AppConfig;

/// Open the store described by `config.database`
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn ModelStore>> {
    let store = if config.database.in_memory {
        info!("Using in-memory model store; regressions are lost on exit");
        SqliteModelStore::open_in_memory()?
    } else {
        SqliteModelStore::open(&config.database.path)?
    };
    Ok(Arc::new(store))
}

/// Build the regression service from configuration
pub fn build_service(config: &AppConfig) -> Result<RegressionService> {
    config.validate()?;
    let registry = config.registry()?;
    let store = open_store(config)?;
    info!(
        "Model classes enabled: {}",
        registry.class_names().join(", ")
    );
    Ok(RegressionService::new(store, registry))
}

/// Serve the API until shutdown
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let service = build_service(&config)?;
    let server = ApiServer::new(config.server.clone(), Arc::new(service));
    server.start().await
}
