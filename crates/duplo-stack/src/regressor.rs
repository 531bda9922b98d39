//! Quantile-Stacked Multi-Regressor
//!
//! A meta regressor for model stacking on zero-inflated or heavily skewed
//! targets. It combines:
//!
//! - propensity classifiers, one per cut point, each predicting whether the
//!   target exceeds its cut
//! - auxiliary regressors predicting the target directly
//! - a final regressor trained on the original features plus the outputs of
//!   the two families above
//!
//! Classifiers and auxiliary regressors are cross-fitted on two folds: the
//! models trained on one fold produce the engineered columns of the other, so
//! the final regressor never sees a score computed on a model's own training
//! rows. At prediction time every engineered column is the average of the two
//! folds' models.

use crate::error::{Result, StackError};
use crate::fold::{Fold, FoldPair, FoldSplit};
use crate::layout::AugmentedLayout;
use duplo_core::{
    BoxedRegressor, Classifier, Estimator, EstimatorKind, ModelError, Regressor, ensure_kind,
};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

fn default_cuts() -> Vec<f64> {
    vec![0.0]
}

/// Configuration for the stacked regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    /// Cut points; each adds a `target > cut` propensity column (default: [0.0])
    #[serde(default = "default_cuts")]
    pub cuts: Vec<f64>,

    /// Seed for the fold split; `None` draws from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            cuts: default_cuts(),
            seed: None,
        }
    }
}

/// State created by a successful fit
#[derive(Debug, Clone)]
struct FittedStack<C, A, R> {
    split: FoldSplit,
    classifiers: FoldPair<Vec<C>>,
    auxiliaries: FoldPair<Vec<A>>,
    regressor: R,
    layout: AugmentedLayout,
}

/// Stacked regressor over cross-fitted propensity and auxiliary models
///
/// Type parameters:
/// * `C` - propensity classifier prototype
/// * `A` - auxiliary regressor type ([`BoxedRegressor`] to mix model types)
/// * `R` - final regressor prototype
#[derive(Debug, Clone)]
pub struct QuantileStackedRegressor<C, A, R> {
    config: StackConfig,
    classifier: C,
    regressor_list: Vec<A>,
    regressor: R,
    fitted: Option<FittedStack<C, A, R>>,
}

impl<C, R> QuantileStackedRegressor<C, BoxedRegressor<Array2<f64>>, R> {
    /// Stack `classifier` propensities into `regressor`, with cuts `[0.0]`
    /// and no auxiliary regressors
    pub fn new(classifier: C, regressor: R) -> Self {
        Self::from_parts(classifier, Vec::new(), regressor, StackConfig::default())
    }
}

impl<C, A, R> QuantileStackedRegressor<C, A, R> {
    /// Create from every component explicitly
    pub const fn from_parts(
        classifier: C,
        regressor_list: Vec<A>,
        regressor: R,
        config: StackConfig,
    ) -> Self {
        Self {
            config,
            classifier,
            regressor_list,
            regressor,
            fitted: None,
        }
    }

    /// Replace the auxiliary regressors
    pub fn with_auxiliary<A2>(self, regressor_list: Vec<A2>) -> QuantileStackedRegressor<C, A2, R> {
        QuantileStackedRegressor::from_parts(
            self.classifier,
            regressor_list,
            self.regressor,
            self.config,
        )
    }

    /// Replace the cut points
    pub fn with_cuts(mut self, cuts: impl IntoIterator<Item = f64>) -> Self {
        self.config.cuts = cuts.into_iter().collect();
        self.fitted = None;
        self
    }

    /// Make the fold split reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self.fitted = None;
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: StackConfig) -> Self {
        self.config = config;
        self.fitted = None;
        self
    }

    /// Configuration
    pub const fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Cut points
    pub fn cuts(&self) -> &[f64] {
        &self.config.cuts
    }

    /// Unfitted classifier prototype
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Unfitted auxiliary regressor prototypes
    pub fn regressor_list(&self) -> &[A] {
        &self.regressor_list
    }

    /// Unfitted final regressor prototype
    pub const fn regressor(&self) -> &R {
        &self.regressor
    }

    /// Whether `fit` has completed successfully
    pub const fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Fold assignment drawn during fit
    pub fn fold_split(&self) -> Option<&FoldSplit> {
        self.fitted.as_ref().map(|f| &f.split)
    }

    /// Propensity classifiers trained on `fold`, in cut order
    pub fn cut_classifiers(&self, fold: Fold) -> Option<&[C]> {
        self.fitted.as_ref().map(|f| f.classifiers[fold].as_slice())
    }

    /// Auxiliary regressors trained on `fold`, in list order
    pub fn auxiliary_regressors(&self, fold: Fold) -> Option<&[A]> {
        self.fitted.as_ref().map(|f| f.auxiliaries[fold].as_slice())
    }

    /// Fitted final regressor
    pub fn final_regressor(&self) -> Option<&R> {
        self.fitted.as_ref().map(|f| &f.regressor)
    }

    /// Layout of the augmented matrix seen by the final regressor
    pub fn layout(&self) -> Option<AugmentedLayout> {
        self.fitted.as_ref().map(|f| f.layout)
    }
}

impl<C, A, R> QuantileStackedRegressor<C, A, R>
where
    C: Classifier<Array2<f64>> + Clone,
    A: Regressor<Array2<f64>> + Clone,
    R: Regressor<Array2<f64>> + Clone,
{
    /// Fit the model on a random two-fold split
    ///
    /// # Arguments
    /// * `features` - Training matrix (rows x features)
    /// * `target` - One value per row
    /// * `sample_weight` - Optional per-row weights for the final regressor;
    ///   split and reordered together with the rows
    ///
    /// # Errors
    /// Fails on a capability mismatch, misaligned inputs, fewer than two rows,
    /// or any sub-model failure. The model is left unfitted on error.
    pub fn fit(
        &mut self,
        features: &Array2<f64>,
        target: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<&mut Self> {
        self.fitted = None;
        self.validate(features, target, sample_weight)?;
        let split = FoldSplit::random(features.nrows(), self.config.seed)?;
        self.fit_folds(features, target, sample_weight, split)
    }

    /// Fit the model on a caller-supplied fold split
    pub fn fit_with_split(
        &mut self,
        features: &Array2<f64>,
        target: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
        split: FoldSplit,
    ) -> Result<&mut Self> {
        self.fitted = None;
        self.validate(features, target, sample_weight)?;
        if split.n_rows() != features.nrows() {
            return Err(StackError::LengthMismatch {
                what: "fold split",
                expected: features.nrows(),
                actual: split.n_rows(),
            });
        }
        self.fit_folds(features, target, sample_weight, split)
    }

    fn validate(
        &self,
        features: &Array2<f64>,
        target: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<()> {
        ensure_kind(&self.classifier, "classifier", EstimatorKind::Classifier)?;
        ensure_kind(&self.regressor, "regressor", EstimatorKind::Regressor)?;
        for auxiliary in &self.regressor_list {
            ensure_kind(auxiliary, "regressor_list", EstimatorKind::Regressor)?;
        }

        let n_rows = features.nrows();
        if target.len() != n_rows {
            return Err(StackError::LengthMismatch {
                what: "target",
                expected: n_rows,
                actual: target.len(),
            });
        }
        if let Some(weights) = sample_weight
            && weights.len() != n_rows
        {
            return Err(StackError::LengthMismatch {
                what: "sample_weight",
                expected: n_rows,
                actual: weights.len(),
            });
        }
        Ok(())
    }

    fn fit_folds(
        &mut self,
        features: &Array2<f64>,
        target: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
        split: FoldSplit,
    ) -> Result<&mut Self> {
        let layout = AugmentedLayout::new(
            features.ncols(),
            self.config.cuts.len(),
            self.regressor_list.len(),
        );
        debug!(
            rows = features.nrows(),
            fold_a = split.len(Fold::A),
            fold_b = split.len(Fold::B),
            cuts = layout.n_cuts,
            auxiliary = layout.n_auxiliary,
            "fitting quantile-stacked regressor"
        );

        let x = FoldPair::from_fn(|fold| split.select_rows(features, fold));
        let y = FoldPair::from_fn(|fold| split.select_values(target, fold));

        // Propensity classifiers, one per (fold, cut)
        let classifiers = FoldPair::try_from_fn(|fold| {
            self.config
                .cuts
                .iter()
                .enumerate()
                .map(|(index, &cut)| {
                    let labels = y[fold].mapv(|v| v > cut);
                    trace!(
                        %fold,
                        cut,
                        positives = labels.iter().filter(|&&l| l).count(),
                        "fitting cut classifier"
                    );
                    self.classifier
                        .spawn_and_fit(&x[fold], labels.view(), None)
                        .map_err(|source| StackError::SubModel {
                            stage: "cut classifier",
                            fold,
                            index,
                            source,
                        })
                })
                .collect::<Result<Vec<C>>>()
        })?;

        // Auxiliary regressors, one per (fold, list entry)
        let auxiliaries = FoldPair::try_from_fn(|fold| {
            self.regressor_list
                .iter()
                .enumerate()
                .map(|(index, auxiliary)| {
                    auxiliary
                        .spawn_and_fit(&x[fold], y[fold].view(), None)
                        .map_err(|source| StackError::SubModel {
                            stage: "auxiliary regressor",
                            fold,
                            index,
                            source,
                        })
                })
                .collect::<Result<Vec<A>>>()
        })?;

        // Engineered columns of each fold come from the other fold's models
        let augmented = FoldPair::try_from_fn(|fold| {
            let donor = fold.other();
            let cut_columns = classifiers[donor]
                .iter()
                .enumerate()
                .map(|(index, classifier)| {
                    classifier
                        .positive_proba(&x[fold])
                        .map_err(|source| StackError::SubModel {
                            stage: "cut classifier",
                            fold: donor,
                            index,
                            source,
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            let auxiliary_columns = auxiliaries[donor]
                .iter()
                .enumerate()
                .map(|(index, auxiliary)| {
                    auxiliary
                        .predict(&x[fold])
                        .map_err(|source| StackError::SubModel {
                            stage: "auxiliary regressor",
                            fold: donor,
                            index,
                            source,
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            layout.assemble(x[fold].view(), &cut_columns, &auxiliary_columns)
        })?;

        // Fold A rows then fold B rows, with target and weights in the same order
        let stacked = ndarray::concatenate(
            Axis(0),
            &[augmented[Fold::A].view(), augmented[Fold::B].view()],
        )?;
        let order = split.concatenated_order();
        let stacked_target = target.select(Axis(0), &order);
        let stacked_weight = sample_weight.map(|w| w.select(Axis(0), &order));

        let regressor = self.regressor.spawn_and_fit(
            &stacked,
            stacked_target.view(),
            stacked_weight.as_ref().map(|w| w.view()),
        )?;

        debug!(width = layout.width(), "fitted final regressor");

        self.fitted = Some(FittedStack {
            split,
            classifiers,
            auxiliaries,
            regressor,
            layout,
        });
        Ok(self)
    }

    /// Augmented matrix fed to the final regressor at predict time
    ///
    /// Original features, then the fold-averaged propensity for each cut, then
    /// the fold-averaged prediction of each auxiliary regressor.
    pub fn augment(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let fitted = self.fitted.as_ref().ok_or(StackError::NotFitted)?;
        if features.ncols() != fitted.layout.n_features {
            return Err(StackError::DimensionMismatch {
                expected: fitted.layout.n_features,
                actual: features.ncols(),
            });
        }

        let cut_columns = (0..fitted.layout.n_cuts)
            .map(|index| {
                fold_average(&fitted.classifiers, index, "cut classifier", |c| {
                    c.positive_proba(features)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let auxiliary_columns = (0..fitted.layout.n_auxiliary)
            .map(|index| {
                fold_average(&fitted.auxiliaries, index, "auxiliary regressor", |r| {
                    r.predict(features)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        fitted
            .layout
            .assemble(features.view(), &cut_columns, &auxiliary_columns)
    }

    /// Predict one value per row of `features`
    pub fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        let fitted = self.fitted.as_ref().ok_or(StackError::NotFitted)?;
        let augmented = self.augment(features)?;
        let predictions = fitted.regressor.predict(&augmented)?;
        if predictions.len() != features.nrows() {
            return Err(ModelError::DimensionMismatch {
                expected: features.nrows(),
                actual: predictions.len(),
            }
            .into());
        }
        Ok(predictions)
    }
}

/// Mean of the two folds' outputs for sub-model `index`
fn fold_average<M>(
    models: &FoldPair<Vec<M>>,
    index: usize,
    stage: &'static str,
    score: impl Fn(&M) -> duplo_core::Result<Array1<f64>>,
) -> Result<Array1<f64>> {
    let score_fold = |fold: Fold| {
        score(&models[fold][index]).map_err(|source| StackError::SubModel {
            stage,
            fold,
            index,
            source,
        })
    };
    let a = score_fold(Fold::A)?;
    let b = score_fold(Fold::B)?;
    if a.len() != b.len() {
        return Err(StackError::LengthMismatch {
            what: stage,
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok((&a + &b) / 2.0)
}

impl<C, A, R> Estimator for QuantileStackedRegressor<C, A, R>
where
    C: Estimator,
    A: Estimator,
    R: Estimator,
{
    fn name(&self) -> &str {
        "quantile_stacked_regressor"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }
}

impl<C, A, R> Regressor<Array2<f64>> for QuantileStackedRegressor<C, A, R>
where
    C: Classifier<Array2<f64>> + Clone,
    A: Regressor<Array2<f64>> + Clone,
    R: Regressor<Array2<f64>> + Clone,
{
    fn fit(
        &mut self,
        x: &Array2<f64>,
        y: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> duplo_core::Result<()> {
        Self::fit(self, x, y, sample_weight)
            .map(|_| ())
            .map_err(ModelError::wrapped)
    }

    fn predict(&self, x: &Array2<f64>) -> duplo_core::Result<Array1<f64>> {
        Self::predict(self, x).map_err(ModelError::wrapped)
    }
}
