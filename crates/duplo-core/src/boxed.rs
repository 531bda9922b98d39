//! Type-erased estimators
//!
//! A meta-estimator holds its auxiliary models in a `Vec`, which forces a
//! single element type. Boxing each model as a [`BoxedRegressor`] (or
//! [`BoxedClassifier`]) lets one list mix unrelated model types while keeping
//! the clone-and-fit behaviour needed for cross-fitting.

use crate::error::Result;
use crate::estimator::{Classifier, Estimator, EstimatorKind, Regressor};
use ndarray::{Array1, Array2, ArrayView1};

/// Object-safe regressor that can clone itself behind a box
pub trait DynRegressor<X: ?Sized>: Regressor<X> {
    /// Clone into a new box
    fn clone_box(&self) -> Box<dyn DynRegressor<X>>;
}

impl<X, T> DynRegressor<X> for T
where
    X: ?Sized,
    T: Regressor<X> + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn DynRegressor<X>> {
        Box::new(self.clone())
    }
}

/// Boxed regressor over inputs of type `X`
pub type BoxedRegressor<X> = Box<dyn DynRegressor<X>>;

impl<X: ?Sized> Clone for Box<dyn DynRegressor<X>> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

impl<X: ?Sized> Estimator for Box<dyn DynRegressor<X>> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> EstimatorKind {
        (**self).kind()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<X: ?Sized> Regressor<X> for Box<dyn DynRegressor<X>> {
    fn fit(
        &mut self,
        x: &X,
        y: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()> {
        (**self).fit(x, y, sample_weight)
    }

    fn predict(&self, x: &X) -> Result<Array1<f64>> {
        (**self).predict(x)
    }
}

/// Object-safe classifier that can clone itself behind a box
pub trait DynClassifier<X: ?Sized>: Classifier<X> {
    /// Clone into a new box
    fn clone_box(&self) -> Box<dyn DynClassifier<X>>;
}

impl<X, T> DynClassifier<X> for T
where
    X: ?Sized,
    T: Classifier<X> + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn DynClassifier<X>> {
        Box::new(self.clone())
    }
}

/// Boxed classifier over inputs of type `X`
pub type BoxedClassifier<X> = Box<dyn DynClassifier<X>>;

impl<X: ?Sized> Clone for Box<dyn DynClassifier<X>> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

impl<X: ?Sized> Estimator for Box<dyn DynClassifier<X>> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> EstimatorKind {
        (**self).kind()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<X: ?Sized> Classifier<X> for Box<dyn DynClassifier<X>> {
    fn fit(
        &mut self,
        x: &X,
        y: ArrayView1<'_, bool>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()> {
        (**self).fit(x, y, sample_weight)
    }

    fn predict_proba(&self, x: &X) -> Result<Array2<f64>> {
        (**self).predict_proba(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{MeanRegressor, PriorClassifier};
    use approx::assert_relative_eq;
    use ndarray::array;

    #[derive(Debug, Clone)]
    struct Constant(f64);

    impl Estimator for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn kind(&self) -> EstimatorKind {
            EstimatorKind::Regressor
        }
    }

    impl Regressor<Array2<f64>> for Constant {
        fn fit(
            &mut self,
            _x: &Array2<f64>,
            _y: ArrayView1<'_, f64>,
            _sample_weight: Option<ArrayView1<'_, f64>>,
        ) -> Result<()> {
            Ok(())
        }

        fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
            Ok(Array1::from_elem(x.nrows(), self.0))
        }
    }

    #[test]
    fn test_heterogeneous_regressor_list() {
        let list: Vec<BoxedRegressor<Array2<f64>>> =
            vec![Box::new(MeanRegressor::new()), Box::new(Constant(7.0))];
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 2.0, 6.0];

        let fitted: Vec<_> = list
            .iter()
            .map(|m| m.spawn_and_fit(&x, y.view(), None).unwrap())
            .collect();

        assert_relative_eq!(fitted[0].predict(&x).unwrap()[0], 3.0);
        assert_relative_eq!(fitted[1].predict(&x).unwrap()[2], 7.0);
        // The prototypes stay unfitted
        assert!(list[0].predict(&x).is_err());
    }

    #[test]
    fn test_boxed_reports_inner_identity() {
        let boxed: BoxedRegressor<Array2<f64>> = Box::new(Constant(1.0));
        assert_eq!(boxed.name(), "constant");
        assert!(boxed.type_name().ends_with("Constant"));

        let clf: BoxedClassifier<Array2<f64>> = Box::new(PriorClassifier::new());
        assert_eq!(clf.kind(), EstimatorKind::Classifier);
        assert!(clf.type_name().ends_with("PriorClassifier"));
    }
}
