//! Error types for the baseline-proportional regressor.

use duplo_core::{CapabilityError, ModelError};
use thiserror::Error;

/// Result type for baseline operations.
pub type Result<T> = std::result::Result<T, BaselineError>;

/// Errors that can occur while fitting or predicting with a baseline model.
#[derive(Debug, Error)]
pub enum BaselineError {
    /// A baseline key column is absent from the input frame
    #[error("Baseline key column `{column}` not found in features")]
    MissingColumn {
        /// Name of the missing column
        column: String,
    },

    /// A key column uses a name reserved for internal lookup columns
    #[error("Baseline key column `{column}` uses a reserved name")]
    ReservedColumn {
        /// Name of the offending column
        column: String,
    },

    /// No baseline key columns configured
    #[error("At least one baseline key column is required")]
    NoKeyColumns,

    /// Wrapped model lacks the regressor capability
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    /// Predict called before a successful fit
    #[error("BaselineProportionalRegressor is not fitted yet, call `fit` before `predict`")]
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
    #[error("Dimension mismatch: fitted on {expected} columns, got {actual}")]
    DimensionMismatch {
        /// Column count at fit time
        expected: usize,
        /// Column count received
        actual: usize,
    },

    /// Relative target would divide by a zero baseline
    #[error("Zero baseline for {rows} row(s), first at row {first_row}; relative target undefined")]
    ZeroBaseline {
        /// Number of rows with a zero baseline
        rows: usize,
        /// Index of the first such row
        first_row: usize,
    },

    /// No rows to fit on
    #[error("Cannot fit on an empty frame")]
    EmptyInput,

    /// Wrapped model failure
    #[error("Wrapped regressor error: {0}")]
    Model(#[from] ModelError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
