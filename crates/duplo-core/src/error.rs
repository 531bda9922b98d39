//! Error types shared by wrapped models and meta-estimators.

use crate::estimator::EstimatorKind;
use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by a wrapped model's `fit`, `predict` or `predict_proba`.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Model used before a successful fit
    #[error("{model} is not fitted yet, call `fit` before using it")]
    NotFitted {
        /// Name of the model
        model: String,
    },

    /// Shape of an input does not match what the model expects
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// No rows to fit on
    #[error("Cannot fit {model} on an empty dataset")]
    EmptyInput {
        /// Name of the model
        model: String,
    },

    /// Probability matrix without a positive-class column
    #[error("predict_proba returned {columns} column(s), need at least 2")]
    InvalidProbabilities {
        /// Number of columns returned
        columns: usize,
    },

    /// Input values the model cannot work with
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Failure of a nested meta-estimator
    #[error(transparent)]
    Wrapped(Box<dyn std::error::Error + Send + Sync>),
}

impl ModelError {
    /// Box any error into [`ModelError::Wrapped`].
    pub fn wrapped<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Wrapped(Box::new(err))
    }
}

/// A constructor argument does not carry the capability it is used for.
#[derive(Debug, Clone, Error)]
#[error(
    "`{argument}` has to be a {expected}. Received instance of {actual_type} ({found}) instead."
)]
pub struct CapabilityError {
    /// Constructor argument that was checked
    pub argument: &'static str,
    /// Capability the argument must provide
    pub expected: EstimatorKind,
    /// Capability the argument reports
    pub found: EstimatorKind,
    /// Concrete type received
    pub actual_type: String,
}
