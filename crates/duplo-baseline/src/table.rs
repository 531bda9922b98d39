//! Baseline lookup table
//!
//! Maps each combination of key-column values seen at fit time to the
//! aggregated target of that group. Lookups are left joins against the input
//! frame; rows whose key combination is absent (or contains a null) take the
//! global default baseline.

use crate::aggregation::Aggregation;
use crate::error::{BaselineError, Result};
use ndarray::{Array1, ArrayView1};
use polars::prelude::*;

/// Name of the aggregated baseline column in the lookup table
pub const BASELINE_COLUMN: &str = "__baseline";

/// Temporary column carrying the input row order through the join
const ROW_INDEX_COLUMN: &str = "__row";

/// Names that key columns may not use
const RESERVED_COLUMNS: [&str; 2] = [BASELINE_COLUMN, ROW_INDEX_COLUMN];

/// Reject key columns that would collide with the internal lookup columns
pub(crate) fn ensure_unreserved(key_columns: &[String]) -> Result<()> {
    key_columns
        .iter()
        .find(|name| RESERVED_COLUMNS.contains(&name.as_str()))
        .map_or(Ok(()), |name| {
            Err(BaselineError::ReservedColumn {
                column: name.clone(),
            })
        })
}

/// Per-row baselines resolved from a [`BaselineTable`]
#[derive(Debug, Clone)]
pub struct BaselineLookup {
    /// Baseline for each input row, in input order
    pub values: Array1<f64>,
    /// Number of rows that fell back to the default baseline
    pub fallback_rows: usize,
}

/// Group-level baselines plus the global fallback
#[derive(Debug, Clone)]
pub struct BaselineTable {
    key_columns: Vec<String>,
    table: DataFrame,
    default_baseline: f64,
}

impl BaselineTable {
    /// Aggregate `target` per distinct combination of `key_columns`
    ///
    /// # Arguments
    /// * `features` - Frame containing every key column
    /// * `target` - One value per row of `features`
    /// * `key_columns` - Grouping key, in order
    /// * `aggregation` - Statistic computed per group and over the whole target
    pub fn build(
        features: &DataFrame,
        target: ArrayView1<'_, f64>,
        key_columns: &[String],
        aggregation: Aggregation,
    ) -> Result<Self> {
        ensure_unreserved(key_columns)?;
        let default_baseline = aggregation.apply(target).ok_or(BaselineError::EmptyInput)?;

        let mut frame = features.select(key_columns.iter().map(String::as_str))?;
        frame.with_column(Column::new(BASELINE_COLUMN.into(), target.to_vec()))?;

        let table = frame
            .lazy()
            .group_by(key_exprs(key_columns))
            .agg([aggregation.expr(col(BASELINE_COLUMN))])
            .collect()?;

        Ok(Self {
            key_columns: key_columns.to_vec(),
            table,
            default_baseline,
        })
    }

    /// Resolve the baseline of every row of `features`, preserving row order
    pub fn lookup(&self, features: &DataFrame) -> Result<BaselineLookup> {
        ensure_unreserved(&self.key_columns)?;
        let keys = key_exprs(&self.key_columns);
        let frame = features
            .select(self.key_columns.iter().map(String::as_str))?
            .with_row_index(ROW_INDEX_COLUMN.into(), None)?;

        let joined = frame
            .lazy()
            .join(
                self.table.clone().lazy(),
                keys.clone(),
                keys,
                JoinArgs::new(JoinType::Left),
            )
            .sort([ROW_INDEX_COLUMN], Default::default())
            .collect()?;

        let baselines = joined.column(BASELINE_COLUMN)?.f64()?;
        let fallback_rows = baselines.null_count();
        let values = baselines
            .into_iter()
            .map(|value| value.unwrap_or(self.default_baseline))
            .collect::<Array1<f64>>();

        if values.len() != features.height() {
            return Err(BaselineError::LengthMismatch {
                what: "baseline lookup",
                expected: features.height(),
                actual: values.len(),
            });
        }

        Ok(BaselineLookup {
            values,
            fallback_rows,
        })
    }

    /// Lookup table: key columns plus [`BASELINE_COLUMN`], one row per group
    pub const fn table(&self) -> &DataFrame {
        &self.table
    }

    /// Baseline used for unseen key combinations
    pub const fn default_baseline(&self) -> f64 {
        self.default_baseline
    }

    /// Number of distinct groups seen at fit time
    pub fn n_groups(&self) -> usize {
        self.table.height()
    }

    /// Grouping key columns
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }
}

fn key_exprs(key_columns: &[String]) -> Vec<Expr> {
    key_columns.iter().map(|name| col(name.as_str())).collect()
}
