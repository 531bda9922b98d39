//! Estimator capability traits
//!
//! Meta-estimators never look inside the models they wrap. They only rely on
//! the capabilities declared here:
//!
//! - [`Regressor`]: `fit(x, y, sample_weight)` and `predict(x)`
//! - [`Classifier`]: `fit(x, labels, sample_weight)` and `predict_proba(x)`
//!
//! Every model also implements [`Estimator`], which carries the estimator-type
//! tag used for the capability check performed at fit time.

use crate::error::{CapabilityError, ModelError, Result};
use derive_more::Display;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Data, Ix2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Estimator-type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum EstimatorKind {
    /// Predicts a continuous target
    #[display("regressor")]
    Regressor,
    /// Predicts class membership probabilities
    #[display("classifier")]
    Classifier,
}

/// Common behaviour of every estimator
pub trait Estimator: Debug {
    /// Short human readable name, used in error messages and logs
    fn name(&self) -> &str;

    /// Estimator-type tag
    fn kind(&self) -> EstimatorKind;

    /// Fully qualified type name of the concrete estimator
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Regression capability over inputs of type `X`
///
/// `fit` must replace any previously fitted state, so that a clone of a fitted
/// model can be refitted from scratch.
pub trait Regressor<X: ?Sized>: Estimator {
    /// Fit the model on `x` against `y`, optionally weighting each row
    fn fit(
        &mut self,
        x: &X,
        y: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()>;

    /// Predict one value per row of `x`
    fn predict(&self, x: &X) -> Result<Array1<f64>>;

    /// Clone this model as a prototype and fit the clone
    ///
    /// The prototype itself is left untouched.
    fn spawn_and_fit(
        &self,
        x: &X,
        y: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<Self>
    where
        Self: Clone + Sized,
    {
        let mut model = self.clone();
        <Self as Regressor<X>>::fit(&mut model, x, y, sample_weight)?;
        Ok(model)
    }
}

/// Binary classification capability over inputs of type `X`
pub trait Classifier<X: ?Sized>: Estimator {
    /// Fit the model on `x` against boolean labels
    fn fit(
        &mut self,
        x: &X,
        y: ArrayView1<'_, bool>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()>;

    /// Per-class probabilities, one row per input row; column 1 is the
    /// positive class
    fn predict_proba(&self, x: &X) -> Result<Array2<f64>>;

    /// Probability of the positive class for each row
    fn positive_proba(&self, x: &X) -> Result<Array1<f64>>
    where
        X: Dataset,
    {
        let n_rows = x.n_rows();
        let proba = self.predict_proba(x)?;
        let (rows, columns) = proba.dim();
        if columns < 2 {
            return Err(ModelError::InvalidProbabilities { columns });
        }
        if rows != n_rows {
            return Err(ModelError::DimensionMismatch {
                expected: n_rows,
                actual: rows,
            });
        }
        Ok(proba.column(1).to_owned())
    }

    /// Hard labels: positive when the positive-class probability exceeds 0.5
    fn predict(&self, x: &X) -> Result<Array1<bool>>
    where
        X: Dataset,
    {
        Ok(self.positive_proba(x)?.mapv(|p| p > 0.5))
    }

    /// Clone this model as a prototype and fit the clone
    fn spawn_and_fit(
        &self,
        x: &X,
        y: ArrayView1<'_, bool>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<Self>
    where
        Self: Clone + Sized,
    {
        let mut model = self.clone();
        <Self as Classifier<X>>::fit(&mut model, x, y, sample_weight)?;
        Ok(model)
    }
}

/// Row/column shape of a model input
pub trait Dataset {
    /// Number of rows (samples)
    fn n_rows(&self) -> usize;

    /// Number of feature columns
    fn n_columns(&self) -> usize;
}

impl<S> Dataset for ArrayBase<S, Ix2>
where
    S: Data,
{
    fn n_rows(&self) -> usize {
        self.nrows()
    }

    fn n_columns(&self) -> usize {
        self.ncols()
    }
}

impl Dataset for DataFrame {
    fn n_rows(&self) -> usize {
        self.height()
    }

    fn n_columns(&self) -> usize {
        self.width()
    }
}

/// Check that `model` carries the `expected` capability tag
///
/// # Arguments
/// * `model` - Constructor argument to check
/// * `argument` - Name of the constructor argument, reported on failure
/// * `expected` - Required estimator kind
pub fn ensure_kind<M>(
    model: &M,
    argument: &'static str,
    expected: EstimatorKind,
) -> std::result::Result<(), CapabilityError>
where
    M: Estimator + ?Sized,
{
    let found = model.kind();
    if found == expected {
        Ok(())
    } else {
        Err(CapabilityError {
            argument,
            expected,
            found,
            actual_type: model.type_name().to_string(),
        })
    }
}
