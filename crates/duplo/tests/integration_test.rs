//! Integration tests for the stacked and baseline-proportional regressors.

use approx::assert_relative_eq;
use duplo::estimator::{MeanRegressor, PriorClassifier, Result};
use duplo::{
    BaselineProportionalRegressor, BoxedRegressor, Classifier, Estimator, EstimatorKind,
    FrameRegressor, ModelError, QuantileStackedRegressor, Regressor, StackConfig,
};
use ndarray::{Array1, Array2, ArrayView1, array};
use polars::prelude::{Column, DataFrame};

/// Certain positive exactly when the first feature is above zero
#[derive(Debug, Clone, Default)]
struct SignStump {
    fitted: bool,
}

impl Estimator for SignStump {
    fn name(&self) -> &str {
        "sign_stump"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Classifier
    }
}

impl Classifier<Array2<f64>> for SignStump {
    fn fit(
        &mut self,
        _x: &Array2<f64>,
        _y: ArrayView1<'_, bool>,
        _sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()> {
        self.fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.fitted {
            return Err(ModelError::NotFitted {
                model: self.name().to_string(),
            });
        }
        let mut proba = Array2::zeros((x.nrows(), 2));
        for (mut row, &x0) in proba.rows_mut().into_iter().zip(x.column(0)) {
            let p = if x0 > 0.0 { 1.0 } else { 0.0 };
            row[0] = 1.0 - p;
            row[1] = p;
        }
        Ok(proba)
    }
}

/// Least squares through the origin on the product of the given columns
#[derive(Debug, Clone)]
struct ScaledProduct {
    factors: Vec<usize>,
    coef: Option<f64>,
}

impl ScaledProduct {
    fn new(factors: impl Into<Vec<usize>>) -> Self {
        Self {
            factors: factors.into(),
            coef: None,
        }
    }

    fn regressor(&self, x: &Array2<f64>) -> Array1<f64> {
        self.factors
            .iter()
            .fold(Array1::ones(x.nrows()), |z, &column| z * &x.column(column))
    }
}

impl Estimator for ScaledProduct {
    fn name(&self) -> &str {
        "scaled_product"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }
}

impl Regressor<Array2<f64>> for ScaledProduct {
    fn fit(
        &mut self,
        x: &Array2<f64>,
        y: ArrayView1<'_, f64>,
        _sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()> {
        let z = self.regressor(x);
        let denominator = z.dot(&z);
        if denominator == 0.0 {
            return Err(ModelError::InvalidInput("regressor is all zeros".to_string()));
        }
        self.coef = Some(z.dot(&y) / denominator);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coef = self.coef.ok_or_else(|| ModelError::NotFitted {
            model: self.name().to_string(),
        })?;
        Ok(self.regressor(x) * coef)
    }
}

/// `x0` alternates between -1 and +1, `x1` grows with the row index
fn zero_inflated(n: usize) -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((n, 2), |(i, j)| match j {
        0 if i % 2 == 0 => -1.0,
        0 => 1.0,
        _ => 1.0 + i as f64 * 0.5,
    });
    let y = x
        .rows()
        .into_iter()
        .map(|row| if row[0] > 0.0 { 3.0 * row[1] } else { 0.0 })
        .collect();
    (x, y)
}

#[test]
fn test_zero_inflated_end_to_end() {
    let (x, y) = zero_inflated(20);

    // Column 2 of the augmented matrix is the `target > 0` propensity
    let mut model = QuantileStackedRegressor::new(SignStump::default(), ScaledProduct::new([2, 1]))
        .with_seed(17);
    model.fit(&x, y.view(), None).unwrap();

    let coef = model.final_regressor().unwrap().coef.unwrap();
    assert_relative_eq!(coef, 3.0, epsilon = 1e-9);

    let unseen = array![[-1.0, 4.0], [1.0, 4.0], [1.0, 0.5]];
    let predictions = model.predict(&unseen).unwrap();
    assert_relative_eq!(predictions[0], 0.0, epsilon = 1e-9);
    assert_relative_eq!(predictions[1], 12.0, epsilon = 1e-9);
    assert_relative_eq!(predictions[2], 1.5, epsilon = 1e-9);
}

#[test]
fn test_stacking_with_weights_and_mixed_auxiliaries() {
    let (x, y) = zero_inflated(30);
    let weights = Array1::from_shape_fn(30, |i| 1.0 + (i % 4) as f64);
    let auxiliary: Vec<BoxedRegressor<Array2<f64>>> = vec![
        Box::new(MeanRegressor::new()),
        Box::new(ScaledProduct::new([0, 1])),
    ];
    let mut model = QuantileStackedRegressor::from_parts(
        PriorClassifier::new(),
        auxiliary,
        MeanRegressor::new(),
        StackConfig {
            cuts: vec![0.0, 5.0, 10.0],
            seed: Some(21),
        },
    );
    model.fit(&x, y.view(), Some(weights.view())).unwrap();

    let layout = model.layout().unwrap();
    assert_eq!(layout.width(), 2 + 3 + 2);

    // The final mean regressor sees every row once with its own weight
    let expected = y.dot(&weights) / weights.sum();
    let predictions = model.predict(&x).unwrap();
    assert_eq!(predictions.len(), 30);
    assert_relative_eq!(predictions[0], expected, epsilon = 1e-9);
    assert!(predictions.iter().all(|p| p.is_finite()));
}

fn store_frame() -> (DataFrame, Array1<f64>) {
    let n = 12;
    let store: Vec<&str> = (0..n).map(|i| if i < 6 { "a" } else { "b" }).collect();
    let x0: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { -1.0 } else { 1.0 }).collect();
    let x1: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let y = (0..n)
        .map(|i| {
            let base = if i < 6 { 10.0 } else { 100.0 };
            base * (1.0 + 0.1 * x0[i])
        })
        .collect();

    let df = DataFrame::new(vec![
        Column::new("store".into(), store),
        Column::new("x0".into(), x0),
        Column::new("x1".into(), x1),
    ])
    .unwrap();
    (df, y)
}

#[test]
fn test_baseline_over_stacked_regressor() {
    let (df, y) = store_frame();

    let stacked =
        QuantileStackedRegressor::new(SignStump::default(), ScaledProduct::new([0])).with_seed(3);
    let mut model =
        BaselineProportionalRegressor::new(["store"], FrameRegressor::new(stacked, ["x0", "x1"]));
    model.fit(&df, y.view(), None).unwrap();

    // Relative targets are 0.1 * x0 around group means of 10 and 100
    let predictions = model.predict(&df).unwrap();
    for (predicted, expected) in predictions.iter().zip(y.iter()) {
        assert_relative_eq!(*predicted, *expected, epsilon = 1e-9);
    }

    // An unseen store falls back to the global mean of 55
    let novel = DataFrame::new(vec![
        Column::new("store".into(), vec!["c"]),
        Column::new("x0".into(), vec![1.0]),
        Column::new("x1".into(), vec![0.0]),
    ])
    .unwrap();
    assert_relative_eq!(model.default_baseline().unwrap(), 55.0, epsilon = 1e-9);
    assert_relative_eq!(model.predict(&novel).unwrap()[0], 60.5, epsilon = 1e-9);
}

#[test]
fn test_composed_model_as_boxed_regressor() {
    let (df, y) = store_frame();
    let prototype: BoxedRegressor<DataFrame> = Box::new(BaselineProportionalRegressor::new(
        ["store"],
        FrameRegressor::new(MeanRegressor::new(), ["x0"]),
    ));
    assert_eq!(prototype.name(), "baseline_proportional_regressor");

    let fitted = prototype.spawn_and_fit(&df, y.view(), None).unwrap();
    let predictions = fitted.predict(&df).unwrap();
    // The mean relative target is zero, so each row gets its group baseline
    assert_relative_eq!(predictions[0], 10.0, epsilon = 1e-9);
    assert_relative_eq!(predictions[11], 100.0, epsilon = 1e-9);

    let clone = fitted.clone();
    assert_eq!(clone.predict(&df).unwrap(), predictions);

    let without_key = df.drop("store").unwrap();
    let err = fitted.predict(&without_key).unwrap_err();
    assert!(err.to_string().contains("store"));
}
