//! Regression Estimators
//!
//! Each supported model class is a variant of [`Estimator`] carrying its fully
//! resolved hyperparameters. Fitting delegates to linfa: ordinary least
//! squares through `linfa-linear`, penalized models through
//! `linfa-elasticnet`.

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_elasticnet::ElasticNet;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, Ix1};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Estimator construction, fit and predict errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimatorError {
    #[error("unknown model class '{0}'")]
    UnknownClass(String),

    #[error("Model_class must be a string")]
    ClassNotString,

    #[error("Hyperparam_dict must be a mapping of names to values")]
    HyperparamsNotMapping,

    #[error("{class} got an unexpected hyperparameter '{name}'")]
    UnexpectedHyperparam { class: &'static str, name: String },

    #[error("hyperparameter '{name}' of {class} must be {expected}")]
    InvalidHyperparam {
        class: &'static str,
        name: &'static str,
        expected: &'static str,
    },

    #[error("cannot fit on an empty dataset")]
    EmptyDataset,

    #[error("found array with 0 sample(s), at least one sample is required")]
    NoSamples,

    #[error("found array with 0 feature(s), at least one feature column is required")]
    NoFeatures,

    #[error("{0}")]
    Fit(String),

    #[error("fit produced non-finite coefficients")]
    NonFiniteFit,

    #[error("X has {found} features, but the model expects {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("prediction produced non-finite values")]
    NonFinitePrediction,
}

/// Shared hyperparameters of the coordinate-descent models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    /// Regularization strength
    pub alpha: f64,
    pub fit_intercept: bool,
    pub max_iter: u32,
    /// Convergence tolerance
    pub tol: f64,
}

impl Default for Penalty {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            fit_intercept: true,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

/// A regression model class with resolved hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Estimator {
    LinearRegression { fit_intercept: bool },
    Ridge { penalty: Penalty },
    Lasso { penalty: Penalty },
    ElasticNet { penalty: Penalty, l1_ratio: f64 },
}

/// Learned parameters of a fitted estimator
#[derive(Debug, Clone, PartialEq)]
pub struct FittedParams {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

impl Estimator {
    /// Class name as accepted in `Model_class`
    pub fn class_name(&self) -> &'static str {
        match self {
            Estimator::LinearRegression { .. } => "LinearRegression",
            Estimator::Ridge { .. } => "Ridge",
            Estimator::Lasso { .. } => "Lasso",
            Estimator::ElasticNet { .. } => "ElasticNet",
        }
    }

    /// Fit on `features` against `targets`
    pub fn fit(
        &self,
        features: Array2<f64>,
        targets: Array1<f64>,
    ) -> Result<FittedParams, EstimatorError> {
        if features.nrows() == 0 {
            return Err(EstimatorError::EmptyDataset);
        }
        if features.ncols() == 0 {
            return Err(EstimatorError::NoFeatures);
        }

        debug!(
            class = self.class_name(),
            samples = features.nrows(),
            features = features.ncols(),
            "Fitting estimator"
        );

        let n_samples = features.nrows() as f64;
        let dataset = Dataset::new(features, targets);
        let fitted = match self {
            Estimator::LinearRegression { fit_intercept } => {
                let model = LinearRegression::new()
                    .with_intercept(*fit_intercept)
                    .fit(&dataset)
                    .map_err(|e| EstimatorError::Fit(e.to_string()))?;
                FittedParams {
                    coefficients: model.params().to_owned(),
                    intercept: model.intercept(),
                }
            }
            // Ridge's alpha weighs the unscaled squared loss; the elastic net
            // loss carries a 1/(2n) factor
            Estimator::Ridge { penalty } => {
                fit_elastic_net(&dataset, penalty, penalty.alpha / n_samples, 0.0)?
            }
            Estimator::Lasso { penalty } => {
                fit_elastic_net(&dataset, penalty, penalty.alpha, 1.0)?
            }
            Estimator::ElasticNet { penalty, l1_ratio } => {
                fit_elastic_net(&dataset, penalty, penalty.alpha, *l1_ratio)?
            }
        };

        if !fitted.intercept.is_finite() || fitted.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(EstimatorError::NonFiniteFit);
        }
        Ok(fitted)
    }
}

fn fit_elastic_net(
    dataset: &Dataset<f64, f64, Ix1>,
    penalty: &Penalty,
    alpha: f64,
    l1_ratio: f64,
) -> Result<FittedParams, EstimatorError> {
    let model = ElasticNet::<f64>::params()
        .penalty(alpha)
        .l1_ratio(l1_ratio)
        .with_intercept(penalty.fit_intercept)
        .max_iterations(penalty.max_iter)
        .tolerance(penalty.tol)
        .fit(dataset)
        .map_err(|e| EstimatorError::Fit(e.to_string()))?;

    Ok(FittedParams {
        coefficients: model.hyperplane().to_owned(),
        intercept: model.intercept(),
    })
}

/// Reads a hyperparameter mapping for one class, rejecting unknown names
pub(crate) struct Hyperparams<'a> {
    class: &'static str,
    values: &'a Map<String, Value>,
}

impl<'a> Hyperparams<'a> {
    pub(crate) fn new(
        class: &'static str,
        values: &'a Map<String, Value>,
        allowed: &[&str],
    ) -> Result<Self, EstimatorError> {
        if let Some(name) = values.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(EstimatorError::UnexpectedHyperparam {
                class,
                name: name.clone(),
            });
        }
        Ok(Self { class, values })
    }

    fn invalid(&self, name: &'static str, expected: &'static str) -> EstimatorError {
        EstimatorError::InvalidHyperparam {
            class: self.class,
            name,
            expected,
        }
    }

    pub(crate) fn bool(&self, name: &'static str, default: bool) -> Result<bool, EstimatorError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(v) => v.as_bool().ok_or_else(|| self.invalid(name, "a boolean")),
        }
    }

    pub(crate) fn f64(&self, name: &'static str, default: f64) -> Result<f64, EstimatorError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(v) => v.as_f64().ok_or_else(|| self.invalid(name, "a number")),
        }
    }

    pub(crate) fn u32(&self, name: &'static str, default: u32) -> Result<u32, EstimatorError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| self.invalid(name, "a non-negative integer")),
        }
    }

    pub(crate) fn penalty(&self) -> Result<Penalty, EstimatorError> {
        let defaults = Penalty::default();
        Ok(Penalty {
            alpha: self.f64("alpha", defaults.alpha)?,
            fit_intercept: self.bool("fit_intercept", defaults.fit_intercept)?,
            max_iter: self.u32("max_iter", defaults.max_iter)?,
            tol: self.f64("tol", defaults.tol)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_regression_recovers_exact_line() {
        let estimator = Estimator::LinearRegression {
            fit_intercept: true,
        };
        let features = array![[10.0], [20.0], [30.0]];
        let targets = array![1.0, 2.0, 3.0];

        let fitted = estimator.fit(features, targets).unwrap();
        assert_eq!(fitted.coefficients.len(), 1);
        assert!((fitted.coefficients[0] - 0.1).abs() < 1e-6);
        assert!(fitted.intercept.abs() < 1e-6);
    }

    #[test]
    fn test_penalized_models_fit_finite_parameters() {
        let features = array![[1.0, 0.5], [2.0, 1.5], [3.0, 2.0], [4.0, 3.5], [5.0, 4.0]];
        let targets = array![2.0, 4.1, 5.9, 8.2, 9.9];

        for estimator in [
            Estimator::Ridge {
                penalty: Penalty::default(),
            },
            Estimator::Lasso {
                penalty: Penalty {
                    alpha: 0.1,
                    ..Penalty::default()
                },
            },
            Estimator::ElasticNet {
                penalty: Penalty::default(),
                l1_ratio: 0.5,
            },
        ] {
            let fitted = estimator.fit(features.clone(), targets.clone()).unwrap();
            assert_eq!(fitted.coefficients.len(), 2, "{}", estimator.class_name());
            assert!(fitted.intercept.is_finite());
        }
    }

    #[test]
    fn test_ridge_alpha_penalizes_unscaled_loss() {
        // closed form for one centered feature: w = sxy / (sxx + alpha)
        let estimator = Estimator::Ridge {
            penalty: Penalty {
                alpha: 100.0,
                tol: 1e-10,
                ..Penalty::default()
            },
        };
        let features = array![[10.0], [20.0], [30.0]];
        let targets = array![1.0, 2.0, 3.0];

        let fitted = estimator.fit(features, targets).unwrap();
        let slope = 20.0 / 300.0;
        assert!((fitted.coefficients[0] - slope).abs() < 1e-6);
        assert!((fitted.intercept - (2.0 - slope * 20.0)).abs() < 1e-6);
    }

    #[test]
    fn test_fit_rejects_empty_inputs() {
        let estimator = Estimator::LinearRegression {
            fit_intercept: true,
        };

        let result = estimator.fit(Array2::zeros((0, 1)), Array1::zeros(0));
        assert_eq!(result, Err(EstimatorError::EmptyDataset));

        let result = estimator.fit(Array2::zeros((3, 0)), Array1::zeros(3));
        assert_eq!(result, Err(EstimatorError::NoFeatures));
    }

    #[test]
    fn test_invalid_penalty_is_a_fit_error() {
        let estimator = Estimator::Lasso {
            penalty: Penalty {
                alpha: -1.0,
                ..Penalty::default()
            },
        };
        let result = estimator.fit(array![[1.0], [2.0]], array![1.0, 2.0]);
        assert!(matches!(result, Err(EstimatorError::Fit(_))));
    }

    #[test]
    fn test_hyperparams_reject_unknown_names_and_types() {
        let values = serde_json::json!({"alpha": 0.5, "normalize": true});
        let values = values.as_object().unwrap();
        let result = Hyperparams::new("Ridge", values, &["alpha"]);
        assert!(matches!(
            result,
            Err(EstimatorError::UnexpectedHyperparam { name, .. }) if name == "normalize"
        ));

        let values = serde_json::json!({"max_iter": -3});
        let values = values.as_object().unwrap();
        let params = Hyperparams::new("Lasso", values, &["max_iter"]).unwrap();
        assert!(matches!(
            params.u32("max_iter", 10),
            Err(EstimatorError::InvalidHyperparam { name: "max_iter", .. })
        ));
    }
}
