//! API Handlers Module
//!
//! This module contains the request handlers for the API system.

use axum::{
    debug_handler,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use std::sync::Arc;

use regressd_core::{ErrorKind, RegressionError, RegressionService};

use crate::models::{
    ErrorResponse, HealthResponse, MessageResponse, ModelClassesResponse, PredictionResponse,
};

/// Represents the state of the API server
pub struct ApiState {
    /// Regression service
    pub service: Arc<RegressionService>,
}

/// Errors returned by handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] RegressionError),

    /// Path segment that is not an integer id
    #[error("Regression {0} doesn't exist")]
    UnknownId(String),

    #[error("request body is too large")]
    PayloadTooLarge,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Service(err) => match err.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ErrorKind::BadRequest => (StatusCode::BAD_REQUEST, err.to_string()),
                ErrorKind::Internal => {
                    tracing::error!("Internal failure: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
            ApiError::UnknownId(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
        };

        if status.is_client_error() {
            tracing::warn!("Rejected request ({}): {}", status, message);
        }
        (status, Json(ErrorResponse { message })).into_response()
    }
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::UnknownId(raw.to_string()))
}

/// An unreadable body becomes `null`, which the service rejects as a
/// malformed request after its own existence checks. Oversized bodies are
/// refused outright.
fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::PayloadTooLarge)
        }
        Err(rejection) => {
            tracing::debug!("Unreadable request body: {}", rejection);
            Ok(Value::Null)
        }
    }
}

/// Health check endpoint
#[debug_handler]
pub async fn health_check(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let regressions = state.service.stored_count()?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        service: "regressd-api".to_string(),
        regressions,
    }))
}

/// List the model classes that can be trained
#[debug_handler]
pub async fn list_model_classes(State(state): State<Arc<ApiState>>) -> Json<ModelClassesResponse> {
    Json(ModelClassesResponse {
        model_classes: state.service.registry().class_names(),
    })
}

/// Train and store a new regression
#[debug_handler]
pub async fn create_regression(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    tracing::debug!("Creating regression");
    let request = body(payload)?;

    let outcome = state.service.create(&request)?;
    Ok(Json(MessageResponse {
        id: outcome.id,
        message: outcome.message,
    }))
}

/// Predict with a stored regression
#[debug_handler]
pub async fn predict(
    State(state): State<Arc<ApiState>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    tracing::debug!("Predicting with regression: {}", raw_id);
    let id = parse_id(&raw_id)?;
    let request = body(payload)?;

    let prediction = state.service.predict(id, &request)?;
    Ok(Json(PredictionResponse {
        id: prediction.id,
        predictions: prediction.predictions,
    }))
}

/// Retrain a stored regression on new data
#[debug_handler]
pub async fn update_regression(
    State(state): State<Arc<ApiState>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    tracing::debug!("Updating regression: {}", raw_id);
    let id = parse_id(&raw_id)?;
    let request = body(payload)?;

    let outcome = state.service.update(id, &request)?;
    Ok(Json(MessageResponse {
        id: outcome.id,
        message: outcome.message,
    }))
}

/// Delete a stored regression
#[debug_handler]
pub async fn delete_regression(
    State(state): State<Arc<ApiState>>,
    Path(raw_id): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    tracing::debug!("Deleting regression: {}", raw_id);
    let id = parse_id(&raw_id)?;

    let outcome = state.service.delete(id)?;
    Ok((
        StatusCode::NO_CONTENT,
        Json(MessageResponse {
            id: outcome.id,
            message: outcome.message,
        }),
    ))
}
