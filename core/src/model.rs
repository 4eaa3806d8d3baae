//! Stored Model Format
//!
//! A fitted regression is persisted as its estimator (class tag plus
//! hyperparameters), coefficients and intercept, bincode-encoded behind a
//! format version.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::estimator::{Estimator, EstimatorError};

/// Version written by [`StoredModel::to_bytes`]
pub const FORMAT_VERSION: u16 = 1;

/// Payload encode/decode errors
#[derive(Debug, thiserror::Error)]
pub enum ModelCodecError {
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("unsupported model format version {0}")]
    UnsupportedVersion(u16),
}

/// A fitted regression model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredModel {
    pub format_version: u16,
    pub estimator: Estimator,
    /// One coefficient per feature column
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl StoredModel {
    /// Fit `estimator` and capture the learned parameters
    pub fn fit(
        estimator: Estimator,
        features: Array2<f64>,
        targets: Array1<f64>,
    ) -> Result<Self, EstimatorError> {
        let fitted = estimator.fit(features, targets)?;
        Ok(Self {
            format_version: FORMAT_VERSION,
            estimator,
            coefficients: fitted.coefficients.to_vec(),
            intercept: fitted.intercept,
        })
    }

    /// Retrain the same class and hyperparameters on new data
    pub fn refit(&self, features: Array2<f64>, targets: Array1<f64>) -> Result<Self, EstimatorError> {
        Self::fit(self.estimator.clone(), features, targets)
    }

    /// Number of feature columns the model expects
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// One prediction per row of `features`
    pub fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>, EstimatorError> {
        if features.ncols() != self.n_features() {
            return Err(EstimatorError::ShapeMismatch {
                expected: self.n_features(),
                found: features.ncols(),
            });
        }
        if features.nrows() == 0 {
            return Err(EstimatorError::NoSamples);
        }

        let coefficients = Array1::from(self.coefficients.clone());
        let predictions = features.dot(&coefficients) + self.intercept;
        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(EstimatorError::NonFinitePrediction);
        }
        Ok(predictions)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelCodecError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelCodecError> {
        // The version leads the encoding, so check it before decoding the rest
        let version: u16 = bincode::deserialize(bytes)?;
        if version != FORMAT_VERSION {
            return Err(ModelCodecError::UnsupportedVersion(version));
        }
        Ok(bincode::deserialize(bytes)?)
    }
}
