//! Regression Service
//!
//! The four request operations: create, predict, update, delete. Every check
//! runs before the store is touched, so a rejected request never leaves a
//! partial write behind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use regressd_databases::ModelStore;

use crate::dataset::Table;
use crate::error::RegressionError;
use crate::estimator::EstimatorError;
use crate::model::StoredModel;
use crate::registry::ModelRegistry;

pub const DATA_KEY: &str = "Data";
pub const MODEL_CLASS_KEY: &str = "Model_class";
pub const HYPERPARAMS_KEY: &str = "Hyperparam_dict";

/// Confirmation returned by mutating operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: i64,
    pub message: String,
}

/// Result of a predict call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: i64,
    /// One value per input row
    pub predictions: Vec<f64>,
}

/// Train, query, retrain and delete stored regressions
pub struct RegressionService {
    store: Arc<dyn ModelStore>,
    registry: ModelRegistry,
}

impl RegressionService {
    pub fn new(store: Arc<dyn ModelStore>, registry: ModelRegistry) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Number of stored regressions
    pub fn stored_count(&self) -> Result<u64, RegressionError> {
        Ok(self.store.count()?)
    }

    /// Predict with regression `id` on `request["Data"]`
    pub fn predict(&self, id: i64, request: &Value) -> Result<Prediction, RegressionError> {
        debug!(id, "Predict request");
        let model = self.load(id)?;

        let data = request
            .as_object()
            .and_then(|fields| fields.get(DATA_KEY))
            .ok_or(RegressionError::WrongInputFormat)?;
        let table = Table::from_json(data)?;
        if table.n_columns() != model.n_features() {
            debug!(
                id,
                expected = model.n_features(),
                found = table.n_columns(),
                "Feature count mismatch"
            );
            return Err(RegressionError::WrongFeatureCount {
                expected: model.n_features(),
                found: table.n_columns(),
            });
        }
        table.validate()?;

        let features = table.to_matrix()?;
        let predictions = model.predict(&features)?;
        Ok(Prediction {
            id,
            predictions: predictions.to_vec(),
        })
    }

    /// Train a new regression and store it
    pub fn create(&self, request: &Value) -> Result<Outcome, RegressionError> {
        let fields = exact_fields(request, &[DATA_KEY, MODEL_CLASS_KEY, HYPERPARAMS_KEY])?;
        let table = Table::from_json(&fields[DATA_KEY])?;
        table.validate()?;
        let (features, targets) = table
            .split_target()?
            .ok_or(EstimatorError::EmptyDataset)?;

        let estimator = self
            .registry
            .build(&fields[MODEL_CLASS_KEY], &fields[HYPERPARAMS_KEY])?;
        let class = estimator.class_name();
        let model = StoredModel::fit(estimator, features, targets)?;

        let id = self.store.insert(&model.to_bytes()?)?;
        info!(id, class, features = model.n_features(), "Regression trained and saved");
        Ok(Outcome {
            id,
            message: format!("Regression successfully trained and saved under id {id}"),
        })
    }

    /// Retrain regression `id` on `request["Data"]`
    ///
    /// The new data may have a different feature count than the previous fit;
    /// the refit model takes on the new width.
    pub fn update(&self, id: i64, request: &Value) -> Result<Outcome, RegressionError> {
        let fields = exact_fields(request, &[DATA_KEY])?;
        let table = Table::from_json(&fields[DATA_KEY])?;
        table.validate()?;
        let split = table.split_target()?;

        let model = self.load(id)?;
        let (features, targets) = split.ok_or(EstimatorError::EmptyDataset)?;
        let refit = model.refit(features, targets)?;

        if !self.store.update(id, &refit.to_bytes()?)? {
            return Err(RegressionError::NotFound(id));
        }
        info!(id, features = refit.n_features(), "Regression retrained");
        Ok(Outcome {
            id,
            message: format!("Regression {id} successfully retrained"),
        })
    }

    /// Delete regression `id` permanently
    pub fn delete(&self, id: i64) -> Result<Outcome, RegressionError> {
        if !self.store.delete(id)? {
            return Err(RegressionError::NotFound(id));
        }
        info!(id, "Regression deleted");
        Ok(Outcome {
            id,
            message: format!("Regression {id} successfully deleted"),
        })
    }

    fn load(&self, id: i64) -> Result<StoredModel, RegressionError> {
        let record = self.store.get(id)?.ok_or(RegressionError::NotFound(id))?;
        Ok(StoredModel::from_bytes(&record.payload)?)
    }
}

/// The request must be an object with exactly `keys`
fn exact_fields<'a>(
    request: &'a Value,
    keys: &[&str],
) -> Result<&'a Map<String, Value>, RegressionError> {
    let fields = request.as_object().ok_or(RegressionError::WrongInputFormat)?;
    let same_keys =
        fields.len() == keys.len() && keys.iter().all(|key| fields.contains_key(*key));
    if !same_keys {
        return Err(RegressionError::WrongInputFormat);
    }
    Ok(fields)
}
