//! Regression service errors

use regressd_databases::StoreError;

use crate::dataset::DataError;
use crate::estimator::EstimatorError;
use crate::model::ModelCodecError;

/// How an error should be reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced id has no record
    NotFound,
    /// Malformed request, bad data, or the regression library refused it
    BadRequest,
    /// Storage or decoding fault
    Internal,
}

/// Regression service errors
#[derive(Debug, thiserror::Error)]
pub enum RegressionError {
    #[error("Regression {0} doesn't exist")]
    NotFound(i64),

    #[error("wrong input format")]
    WrongInputFormat,

    #[error("Data contains wrong number of features")]
    WrongFeatureCount { expected: usize, found: usize },

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Regression library raised '{0}'. Try another input")]
    Estimator(#[from] EstimatorError),

    #[error("An identical regression is already stored")]
    Duplicate,

    #[error("stored regression could not be decoded: {0}")]
    Codec(#[from] ModelCodecError),

    #[error("storage failure: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for RegressionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => RegressionError::Duplicate,
            other => RegressionError::Storage(other),
        }
    }
}

impl RegressionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegressionError::NotFound(_) => ErrorKind::NotFound,
            RegressionError::WrongInputFormat
            | RegressionError::WrongFeatureCount { .. }
            | RegressionError::Data(_)
            | RegressionError::Estimator(_)
            | RegressionError::Duplicate => ErrorKind::BadRequest,
            RegressionError::Codec(_) | RegressionError::Storage(_) => ErrorKind::Internal,
        }
    }
}
