//! Baseline-Proportional Regressor
//!
//! A meta regressor that learns the target as a proportional difference from
//! a group baseline. The baseline of a row is the aggregated target (mean by
//! default) of all training rows sharing its key-column values.
//!
//! Forward transform at fit time:
//! relative = (y - baseline) / baseline
//!
//! Inverse transform at predict time:
//! y_hat = relative_hat * baseline + baseline
//!
//! Both directions resolve baselines through the same lookup table, so a
//! wrapped regressor that reproduces its training targets makes the whole
//! model reproduce the original targets.

use crate::aggregation::Aggregation;
use crate::error::{BaselineError, Result};
use crate::table::{BaselineTable, ensure_unreserved};
use duplo_core::{Estimator, EstimatorKind, ModelError, Regressor, ensure_kind};
use ndarray::{Array1, ArrayView1};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do when a training row's baseline is exactly zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroBaselinePolicy {
    /// Fail the fit with [`BaselineError::ZeroBaseline`]
    #[default]
    Reject,
    /// Divide anyway; affected relative targets become infinite or NaN
    Propagate,
}

/// Configuration for the baseline-proportional regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Columns whose joint values define a baseline group
    pub key_columns: Vec<String>,

    /// Group statistic (default: mean)
    #[serde(default)]
    pub aggregation: Aggregation,

    /// Handling of zero baselines at fit time (default: reject)
    #[serde(default)]
    pub zero_baseline: ZeroBaselinePolicy,
}

impl BaselineConfig {
    /// Config grouping by `key_columns` with default aggregation and policy
    pub fn new<I, S>(key_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key_columns: key_columns.into_iter().map(Into::into).collect(),
            aggregation: Aggregation::default(),
            zero_baseline: ZeroBaselinePolicy::default(),
        }
    }
}

/// State created by a successful fit
#[derive(Debug, Clone)]
struct FittedBaseline<R> {
    table: BaselineTable,
    regressor: R,
    n_features: usize,
}

/// Meta regressor over a relative-to-baseline target
#[derive(Debug, Clone)]
pub struct BaselineProportionalRegressor<R> {
    config: BaselineConfig,
    regressor: R,
    fitted: Option<FittedBaseline<R>>,
}

impl<R> BaselineProportionalRegressor<R> {
    /// Create a regressor grouping by `key_columns` and wrapping `regressor`
    pub fn new<I, S>(key_columns: I, regressor: R) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(BaselineConfig::new(key_columns), regressor)
    }

    /// Create a regressor from an explicit configuration
    pub const fn with_config(config: BaselineConfig, regressor: R) -> Self {
        Self {
            config,
            regressor,
            fitted: None,
        }
    }

    /// Use `aggregation` for group and default baselines
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.config.aggregation = aggregation;
        self.fitted = None;
        self
    }

    /// Use `policy` for zero baselines
    pub fn with_zero_baseline(mut self, policy: ZeroBaselinePolicy) -> Self {
        self.config.zero_baseline = policy;
        self.fitted = None;
        self
    }

    /// Configuration
    pub const fn config(&self) -> &BaselineConfig {
        &self.config
    }

    /// Unfitted prototype of the wrapped regressor
    pub const fn regressor(&self) -> &R {
        &self.regressor
    }

    /// Whether `fit` has completed successfully
    pub const fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Lookup table built during fit
    pub fn lookup_table(&self) -> Option<&DataFrame> {
        self.fitted.as_ref().map(|f| f.table.table())
    }

    /// Global baseline used for unseen key combinations
    pub fn default_baseline(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.table.default_baseline())
    }

    /// Fitted clone of the wrapped regressor
    pub fn fitted_regressor(&self) -> Option<&R> {
        self.fitted.as_ref().map(|f| &f.regressor)
    }

    /// Baseline of every row of `features`, in row order
    pub fn baselines(&self, features: &DataFrame) -> Result<Array1<f64>> {
        let fitted = self.fitted.as_ref().ok_or(BaselineError::NotFitted)?;
        self.check_key_columns(features)?;
        Ok(fitted.table.lookup(features)?.values)
    }

    fn check_key_columns(&self, features: &DataFrame) -> Result<()> {
        if self.config.key_columns.is_empty() {
            return Err(BaselineError::NoKeyColumns);
        }
        ensure_unreserved(&self.config.key_columns)?;
        for column in &self.config.key_columns {
            if features.column(column).is_err() {
                return Err(BaselineError::MissingColumn {
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<R> BaselineProportionalRegressor<R>
where
    R: Regressor<DataFrame> + Clone,
{
    /// Fit the model
    ///
    /// Builds the baseline lookup table from `target`, converts the target to
    /// its relative deviation from the baseline and fits a clone of the wrapped
    /// regressor on it.
    ///
    /// # Arguments
    /// * `features` - Training frame; must contain every key column
    /// * `target` - One value per row
    /// * `sample_weight` - Optional per-row weights, passed to the wrapped regressor
    ///
    /// # Errors
    /// Fails if the wrapped model is not a regressor, a key column is missing,
    /// lengths disagree, a baseline is zero under [`ZeroBaselinePolicy::Reject`],
    /// or the wrapped regressor fails. The model is left unfitted on error.
    pub fn fit(
        &mut self,
        features: &DataFrame,
        target: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> Result<&mut Self> {
        self.fitted = None;

        ensure_kind(&self.regressor, "regressor", EstimatorKind::Regressor)?;
        self.check_key_columns(features)?;

        let n_rows = features.height();
        if target.len() != n_rows {
            return Err(BaselineError::LengthMismatch {
                what: "target",
                expected: n_rows,
                actual: target.len(),
            });
        }
        if let Some(weights) = sample_weight
            && weights.len() != n_rows
        {
            return Err(BaselineError::LengthMismatch {
                what: "sample_weight",
                expected: n_rows,
                actual: weights.len(),
            });
        }
        if n_rows == 0 {
            return Err(BaselineError::EmptyInput);
        }

        let table = BaselineTable::build(
            features,
            target,
            &self.config.key_columns,
            self.config.aggregation,
        )?;
        let baseline = table.lookup(features)?.values;

        let zero_rows: Vec<usize> = baseline
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == 0.0)
            .map(|(i, _)| i)
            .collect();
        if let Some(&first_row) = zero_rows.first() {
            match self.config.zero_baseline {
                ZeroBaselinePolicy::Reject => {
                    return Err(BaselineError::ZeroBaseline {
                        rows: zero_rows.len(),
                        first_row,
                    });
                }
                ZeroBaselinePolicy::Propagate => {
                    warn!(
                        rows = zero_rows.len(),
                        first_row, "zero baseline, relative target is not finite"
                    );
                }
            }
        }

        let relative = relative_target(target, baseline.view());
        let regressor = self
            .regressor
            .spawn_and_fit(features, relative.view(), sample_weight)?;

        debug!(
            rows = n_rows,
            groups = table.n_groups(),
            default_baseline = table.default_baseline(),
            aggregation = %self.config.aggregation,
            "fitted baseline-proportional regressor"
        );

        self.fitted = Some(FittedBaseline {
            table,
            regressor,
            n_features: features.width(),
        });
        Ok(self)
    }

    /// Predict one value per row of `features`
    ///
    /// Rows whose key combination was not seen during fit use the default
    /// baseline.
    pub fn predict(&self, features: &DataFrame) -> Result<Array1<f64>> {
        let fitted = self.fitted.as_ref().ok_or(BaselineError::NotFitted)?;
        self.check_key_columns(features)?;
        if features.width() != fitted.n_features {
            return Err(BaselineError::DimensionMismatch {
                expected: fitted.n_features,
                actual: features.width(),
            });
        }

        let lookup = fitted.table.lookup(features)?;
        if lookup.fallback_rows > 0 {
            debug!(
                rows = lookup.fallback_rows,
                default_baseline = fitted.table.default_baseline(),
                "unseen baseline keys, using default baseline"
            );
        }

        let relative = fitted.regressor.predict(features)?;
        if relative.len() != lookup.values.len() {
            return Err(ModelError::DimensionMismatch {
                expected: lookup.values.len(),
                actual: relative.len(),
            }
            .into());
        }

        Ok(invert_relative_target(relative.view(), lookup.values.view()))
    }
}

/// (y - baseline) / baseline
fn relative_target(target: ArrayView1<'_, f64>, baseline: ArrayView1<'_, f64>) -> Array1<f64> {
    (&target - &baseline) / &baseline
}

/// relative * baseline + baseline
fn invert_relative_target(
    relative: ArrayView1<'_, f64>,
    baseline: ArrayView1<'_, f64>,
) -> Array1<f64> {
    &relative * &baseline + &baseline
}

impl<R: Estimator> Estimator for BaselineProportionalRegressor<R> {
    fn name(&self) -> &str {
        "baseline_proportional_regressor"
    }

    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Regressor
    }
}

impl<R> Regressor<DataFrame> for BaselineProportionalRegressor<R>
where
    R: Regressor<DataFrame> + Clone,
{
    fn fit(
        &mut self,
        x: &DataFrame,
        y: ArrayView1<'_, f64>,
        sample_weight: Option<ArrayView1<'_, f64>>,
    ) -> duplo_core::Result<()> {
        Self::fit(self, x, y, sample_weight)
            .map(|_| ())
            .map_err(ModelError::wrapped)
    }

    fn predict(&self, x: &DataFrame) -> duplo_core::Result<Array1<f64>> {
        Self::predict(self, x).map_err(ModelError::wrapped)
    }
}
