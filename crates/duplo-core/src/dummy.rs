//! Reference estimators
//!
//! Feature-blind models that predict a training-set statistic. They are useful
//! as baselines for comparison and as stand-ins when wiring up a
//! meta-estimator.

use crate::error::{ModelError, Result};
use crate::estimator::{Classifier, Dataset, Estimator, EstimatorKind, Regressor};
use ndarray::{Array1, Array2, ArrayView1};

/// Validate lengths and compute the (weighted) mean of `values`
fn weighted_mean(
    model: &str,
    n_rows: usize,
    values: impl ExactSizeIterator<Item = f64>,
    sample_weight: Option<ArrayView1<'_, f64>>,
) -> Result<f64> {
    if n_rows == 0 {
        return Err(ModelError::EmptyInput {
            model: model.to_string(),
        });
    }
    if values.len() != n_rows {
        return Err(ModelError::DimensionMismatch {
            expected: n_rows,
            actual: values.len(),
        });
    }

    match sample_weight {
        None => Ok(values.sum::<f64>() / n_rows as f64),
        Some(weights) => {
            if weights.len() != n_rows {
                return Err(ModelError::DimensionMismatch {
                    expected: n_rows,
                    actual: weights.len(),
                });
            }
            let total = weights.sum();
            if total <= 0.0 {
                return Err(ModelError::InvalidInput(
                    "sample weights must sum to a positive value".to_string(),
                ));
            }
            let weighted = values.zip(weights.iter()).map(|(v, w)| v * w).sum::<f64>();
            Ok(weighted / total)
        }
    }
}

/// Predicts the (weighted) mean of the training target for every row
#[derive(Debug, Clone, Default)]
pub struct MeanRegressor {
    mean: Option<f64>,
}

impl MeanRegressor {
    /// Create an unfitted mean regressor
    pub const fn new() -> Self {
        Self { mean: None }
    }

    /// Fitted mean, if any
    pub const fn mean(&self) -> Option<f64> {
        self.mean
    }
}

impl Estimator for MeanRegressor {
    fn name(&self) -> &str {
        "mean_regressor"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }
}

impl<X> Regressor<X> for MeanRegressor
where
    X: Dataset + ?Sized,
{
    fn fit(
        &mut self,
        x: &X,
        y: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()> {
        self.mean = None;
        self.mean = Some(weighted_mean(
            self.name(),
            x.n_rows(),
            y.iter().copied(),
            sample_weight,
        )?);
        Ok(())
    }

    fn predict(&self, x: &X) -> Result<Array1<f64>> {
        let mean = self.mean.ok_or_else(|| ModelError::NotFitted {
            model: self.name().to_string(),
        })?;
        Ok(Array1::from_elem(x.n_rows(), mean))
    }
}

/// Predicts the (weighted) training positive rate for every row
#[derive(Debug, Clone, Default)]
pub struct PriorClassifier {
    positive_rate: Option<f64>,
}

impl PriorClassifier {
    /// Create an unfitted prior classifier
    pub const fn new() -> Self {
        Self {
            positive_rate: None,
        }
    }

    /// Fitted positive rate, if any
    pub const fn positive_rate(&self) -> Option<f64> {
        self.positive_rate
    }
}

impl Estimator for PriorClassifier {
    fn name(&self) -> &str {
        "prior_classifier"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }
}

impl<X> Classifier<X> for PriorClassifier
where
    X: Dataset + ?Sized,
{
    fn fit(
        &mut self,
        x: &X,
        y: ArrayView1<'_, bool>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()> {
        self.positive_rate = None;
        let indicators = y.iter().map(|&label| if label { 1.0 } else { 0.0 });
        self.positive_rate = Some(weighted_mean(
            self.name(),
            x.n_rows(),
            indicators,
            sample_weight,
        )?);
        Ok(())
    }

    fn predict_proba(&self, x: &X) -> Result<Array2<f64>> {
        let p = self.positive_rate.ok_or_else(|| ModelError::NotFitted {
            model: self.name().to_string(),
        })?;
        let mut proba = Array2::zeros((x.n_rows(), 2));
        proba.column_mut(0).fill(1.0 - p);
        proba.column_mut(1).fill(p);
        Ok(proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_mean_regressor_unweighted() {
        let x = Array2::<f64>::zeros((4, 2));
        let y = array![1.0, 2.0, 3.0, 6.0];
        let mut model = MeanRegressor::new();
        model.fit(&x, y.view(), None).unwrap();
        assert_relative_eq!(model.mean().unwrap(), 3.0);

        let preds = model.predict(&Array2::<f64>::zeros((2, 2))).unwrap();
        assert_eq!(preds, array![3.0, 3.0]);
    }

    #[test]
    fn test_mean_regressor_weighted() {
        let x = Array2::<f64>::zeros((2, 1));
        let y = array![0.0, 10.0];
        let w = array![3.0, 1.0];
        let mut model = MeanRegressor::new();
        model.fit(&x, y.view(), Some(w.view())).unwrap();
        assert_relative_eq!(model.mean().unwrap(), 2.5);
    }

    #[test]
    fn test_mean_regressor_not_fitted() {
        let model = MeanRegressor::new();
        let err = Regressor::<Array2<f64>>::predict(&model, &Array2::zeros((1, 1))).unwrap_err();
        assert!(matches!(err, ModelError::NotFitted { .. }));
    }

    #[test]
    fn test_mean_regressor_rejects_mismatched_weights() {
        let x = Array2::<f64>::zeros((2, 1));
        let y = array![0.0, 10.0];
        let w = array![1.0];
        let mut model = MeanRegressor::new();
        let err = model.fit(&x, y.view(), Some(w.view())).unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert!(model.mean().is_none());
    }

    #[test]
    fn test_mean_regressor_rejects_empty() {
        let x = Array2::<f64>::zeros((0, 1));
        let y = Array1::<f64>::zeros(0);
        let mut model = MeanRegressor::new();
        assert!(matches!(
            model.fit(&x, y.view(), None),
            Err(ModelError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_prior_classifier_probabilities() {
        let x = Array2::<f64>::zeros((4, 1));
        let y = array![true, false, false, false];
        let mut model = PriorClassifier::new();
        model.fit(&x, y.view(), None).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (4, 2));
        assert_relative_eq!(proba[[0, 0]], 0.75);
        assert_relative_eq!(proba[[3, 1]], 0.25);
        assert_eq!(model.predict(&x).unwrap(), array![false, false, false, false]);
    }
}
