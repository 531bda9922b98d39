//! DataFrame to matrix conversion
//!
//! Array-based models see a [`DataFrame`] through [`FrameRegressor`], which
//! selects a fixed list of numeric columns and hands the resulting matrix to
//! the wrapped model.

use crate::error::{ModelError, Result};
use crate::estimator::{Estimator, EstimatorKind, Regressor};
use ndarray::{Array1, Array2, ArrayView1};
use polars::prelude::*;

/// Copy the named columns of `df` into a row-major `f64` matrix
///
/// Columns are cast to `Float64`; values that are null or fail to cast are
/// rejected.
pub fn frame_to_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut matrix = Array2::zeros((df.height(), columns.len()));

    for (j, name) in columns.iter().enumerate() {
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let values = column.f64()?;
        let nulls = values.null_count();
        if nulls > 0 {
            return Err(ModelError::InvalidInput(format!(
                "column `{name}` has {nulls} null or non-numeric value(s)"
            )));
        }
        for (i, value) in values.into_iter().enumerate() {
            if let Some(v) = value {
                matrix[[i, j]] = v;
            }
        }
    }

    Ok(matrix)
}

/// Adapts a matrix regressor to named-column input
#[derive(Debug, Clone)]
pub struct FrameRegressor<R> {
    inner: R,
    columns: Vec<String>,
}

impl<R> FrameRegressor<R> {
    /// Wrap `inner`, feeding it `columns` (in this order) from every frame
    pub fn new<I, S>(inner: R, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Feature columns passed to the wrapped model
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Wrapped model
    pub const fn inner(&self) -> &R {
        &self.inner
    }

    /// Unwrap into the wrapped model
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Estimator> Estimator for FrameRegressor<R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> EstimatorKind {
        self.inner.kind()
    }
}

impl<R> Regressor<DataFrame> for FrameRegressor<R>
where
    R: Regressor<Array2<f64>>,
{
    fn fit(
        &mut self,
        x: &DataFrame,
        y: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()> {
        let matrix = frame_to_matrix(x, &self.columns)?;
        self.inner.fit(&matrix, y, sample_weight)
    }

    fn predict(&self, x: &DataFrame) -> Result<Array1<f64>> {
        let matrix = frame_to_matrix(x, &self.columns)?;
        self.inner.predict(&matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::MeanRegressor;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("a".into(), vec![1i64, 2, 3]),
            Column::new("b".into(), vec![0.5f64, 1.5, 2.5]),
            Column::new("store".into(), vec!["x", "y", "x"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_frame_to_matrix_casts_and_orders() {
        let m = frame_to_matrix(&frame(), &["b".to_string(), "a".to_string()]).unwrap();
        assert_eq!(m, array![[0.5, 1.0], [1.5, 2.0], [2.5, 3.0]]);
    }

    #[test]
    fn test_frame_to_matrix_rejects_text() {
        let err = frame_to_matrix(&frame(), &["store".to_string()]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput(_)));
    }

    #[test]
    fn test_frame_to_matrix_missing_column() {
        let err = frame_to_matrix(&frame(), &["nope".to_string()]).unwrap_err();
        assert!(matches!(err, ModelError::Polars(_)));
    }

    #[test]
    fn test_frame_regressor_delegates() {
        let mut model = FrameRegressor::new(MeanRegressor::new(), ["a", "b"]);
        let y = array![2.0, 4.0, 6.0];
        model.fit(&frame(), y.view(), None).unwrap();

        let preds = model.predict(&frame()).unwrap();
        assert_relative_eq!(preds[1], 4.0);
        assert_eq!(model.kind(), EstimatorKind::Regressor);
        assert_eq!(model.columns(), ["a".to_string(), "b".to_string()]);
    }
}
