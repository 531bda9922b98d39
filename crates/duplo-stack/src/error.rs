//! Error types for the stacked regressor.

use crate::fold::Fold;
use duplo_core::{CapabilityError, ModelError};
use thiserror::Error;

/// Result type for stacking operations.
pub type Result<T> = std::result::Result<T, StackError>;

/// Errors that can occur while fitting or predicting with the stacked model.
#[derive(Debug, Error)]
pub enum StackError {
    /// A constructor argument lacks the capability it is used for
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// Predict called before a successful fit
    #[error("QuantileStackedRegressor is not fitted yet, call `fit` before `predict`")]
    NotFitted,

    /// Target or weights do not line up with the feature rows
    #[error("Length mismatch: {what} has {actual} values, features have {expected} rows")]
    LengthMismatch {
        /// Which input is misaligned
        what: &'static str,
        /// Number of feature rows
        expected: usize,
        /// Number of values received
        actual: usize,
    },

    /// Feature width differs from the width seen at fit time
    #[error("Dimension mismatch: expected {expected} columns, got {actual}")]
    DimensionMismatch {
        /// Expected column count
        expected: usize,
        /// Column count received
        actual: usize,
    },

    /// Not enough rows to give both folds at least one
    #[error("Insufficient data: need at least {required} rows to build two folds, got {actual}")]
    TooFewSamples {
        /// Minimum number of rows
        required: usize,
        /// Rows received
        actual: usize,
    },

    /// Fold assignment is not a partition of the rows
    #[error("Invalid fold split: {0}")]
    InvalidSplit(String),

    /// A per-fold sub-model failed
    #[error("{stage} #{index} on fold {fold} failed: {source}")]
    SubModel {
        /// Which family of sub-models failed
        stage: &'static str,
        /// Fold the sub-model belongs to
        fold: Fold,
        /// Position within its family (cut or auxiliary index)
        index: usize,
        /// Underlying failure
        #[source]
        source: ModelError,
    },

    /// Final regressor failure
    #[error("Final regressor error: {0}")]
    Model(#[from] ModelError),

    /// Array shape error
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
