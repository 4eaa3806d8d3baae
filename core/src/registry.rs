//! Model Class Registry
//!
//! Explicit mapping from `Model_class` names to estimator factories. Only
//! registered names can be constructed.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::estimator::{Estimator, EstimatorError, Hyperparams};

/// Builds an estimator from a hyperparameter mapping
pub type EstimatorFactory = fn(&Map<String, Value>) -> Result<Estimator, EstimatorError>;

/// Every class the default registry knows about
pub const DEFAULT_CLASSES: [&str; 4] = ["ElasticNet", "Lasso", "LinearRegression", "Ridge"];

const PENALTY_PARAMS: [&str; 4] = ["alpha", "fit_intercept", "max_iter", "tol"];

fn linear_regression(values: &Map<String, Value>) -> Result<Estimator, EstimatorError> {
    let params = Hyperparams::new("LinearRegression", values, &["fit_intercept"])?;
    Ok(Estimator::LinearRegression {
        fit_intercept: params.bool("fit_intercept", true)?,
    })
}

fn ridge(values: &Map<String, Value>) -> Result<Estimator, EstimatorError> {
    let params = Hyperparams::new("Ridge", values, &PENALTY_PARAMS)?;
    Ok(Estimator::Ridge {
        penalty: params.penalty()?,
    })
}

fn lasso(values: &Map<String, Value>) -> Result<Estimator, EstimatorError> {
    let params = Hyperparams::new("Lasso", values, &PENALTY_PARAMS)?;
    Ok(Estimator::Lasso {
        penalty: params.penalty()?,
    })
}

fn elastic_net(values: &Map<String, Value>) -> Result<Estimator, EstimatorError> {
    let params = Hyperparams::new(
        "ElasticNet",
        values,
        &["alpha", "fit_intercept", "l1_ratio", "max_iter", "tol"],
    )?;
    Ok(Estimator::ElasticNet {
        penalty: params.penalty()?,
        l1_ratio: params.f64("l1_ratio", 0.5)?,
    })
}

fn default_factory(name: &str) -> Option<EstimatorFactory> {
    let factory: EstimatorFactory = match name {
        "LinearRegression" => linear_regression,
        "Ridge" => ridge,
        "Lasso" => lasso,
        "ElasticNet" => elastic_net,
        _ => return None,
    };
    Some(factory)
}

/// Registry of constructible model classes
#[derive(Clone)]
pub struct ModelRegistry {
    factories: BTreeMap<String, EstimatorFactory>,
}

impl ModelRegistry {
    /// Registry with no classes
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry restricted to `names`, each of which must be a known class
    pub fn allow_only<S: AsRef<str>>(names: &[S]) -> Result<Self, EstimatorError> {
        let mut registry = Self::empty();
        for name in names {
            let name = name.as_ref();
            let factory =
                default_factory(name).ok_or_else(|| EstimatorError::UnknownClass(name.to_string()))?;
            registry.register(name, factory);
        }
        Ok(registry)
    }

    /// Add or replace a class
    pub fn register(&mut self, name: &str, factory: EstimatorFactory) {
        debug!("Registering model class {name}");
        self.factories.insert(name.to_string(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered class names, sorted
    pub fn class_names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct an estimator from the raw `Model_class` and `Hyperparam_dict` values
    pub fn build(&self, class: &Value, hyperparams: &Value) -> Result<Estimator, EstimatorError> {
        let name = class.as_str().ok_or(EstimatorError::ClassNotString)?;
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EstimatorError::UnknownClass(name.to_string()))?;
        let values = hyperparams
            .as_object()
            .ok_or(EstimatorError::HyperparamsNotMapping)?;
        factory(values)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        // DEFAULT_CLASSES only holds names default_factory knows
        let mut registry = Self::empty();
        for name in DEFAULT_CLASSES {
            if let Some(factory) = default_factory(name) {
                registry.register(name, factory);
            }
        }
        registry
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("classes", &self.class_names())
            .finish()
    }
}
