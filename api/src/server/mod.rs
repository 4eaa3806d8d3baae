//! API Server Module
//!
//! This module contains the server setup functionality for the API system.

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use regressd_core::RegressionService;

use crate::handlers::{
    create_regression, delete_regression, health_check, list_model_classes, predict,
    update_regression, ApiState,
};
use crate::models::ApiConfig;

/// Build the application router over `state`
///
/// Request bodies are unlimited unless `max_body_bytes` is set.
pub fn build_router(state: Arc<ApiState>, max_body_bytes: Option<usize>) -> Router {
    let body_limit = match max_body_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        // Regression operations
        .route("/api/regressions", post(create_regression))
        .route(
            "/api/regressions/:id",
            axum::routing::put(update_regression).delete(delete_regression),
        )
        .route("/api/regressions/:id/predict", post(predict))
        // Model classes
        .route("/api/model-classes", get(list_model_classes))
        // Health check
        .route("/health", get(health_check))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Main API server
pub struct ApiServer {
    /// Server configuration
    config: ApiConfig,
    /// Shared state
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiConfig, service: Arc<RegressionService>) -> Self {
        let state = Arc::new(ApiState { service });
        Self { config, state }
    }

    /// Router serving this server's state
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.max_body_bytes)
    }

    /// Start the API server and run until Ctrl-C
    pub async fn start(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Starting regressd API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        info!("regressd API server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start API server: {}", e))?;

        info!("regressd API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
