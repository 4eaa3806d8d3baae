//! API Models Module
//!
//! Configuration and the JSON bodies returned by the API.

use serde::{Deserialize, Serialize};

/// API server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Largest accepted request body; unlimited when unset
    pub max_body_bytes: Option<usize>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_bytes: None,
        }
    }
}

/// Confirmation for create, update and delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: i64,
    pub message: String,
}

/// Predictions, one per input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub id: i64,
    pub predictions: Vec<f64>,
}

/// Error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Health check body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    /// Number of stored regressions
    pub regressions: u64,
}

/// Enabled `Model_class` names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelClassesResponse {
    pub model_classes: Vec<String>,
}
