//! regressd Core Module
//!
//! The core module holds everything between an HTTP request and the store:
//! tabular data validation, the model-class registry, the persisted model
//! format, and the [`RegressionService`] that ties them together.

pub mod dataset;
pub mod error;
pub mod estimator;
pub mod model;
pub mod registry;
pub mod service;

pub use dataset::{Cell, DataError, Table};
pub use error::{ErrorKind, RegressionError};
pub use estimator::{Estimator, EstimatorError, Penalty};
pub use model::{ModelCodecError, StoredModel, FORMAT_VERSION};
pub use registry::{EstimatorFactory, ModelRegistry, DEFAULT_CLASSES};
pub use service::{Outcome, Prediction, RegressionService};
