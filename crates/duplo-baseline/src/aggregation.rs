//! Baseline aggregation functions

use derive_more::Display;
use ndarray::ArrayView1;
use polars::prelude::Expr;
use serde::{Deserialize, Serialize};

/// Statistic used to summarise the target within a group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Arithmetic mean
    #[default]
    #[display("mean")]
    Mean,
    /// Median (midpoint of the two central values for even counts)
    #[display("median")]
    Median,
}

impl Aggregation {
    /// Polars aggregation expression over `expr`
    pub fn expr(self, expr: Expr) -> Expr {
        match self {
            Self::Mean => expr.mean(),
            Self::Median => expr.median(),
        }
    }

    /// Apply the aggregation to a whole target vector
    ///
    /// Returns `None` for an empty input.
    pub fn apply(self, values: ArrayView1<'_, f64>) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        match self {
            Self::Mean => values.mean(),
            Self::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    Some((sorted[mid - 1] + sorted[mid]) / 2.0)
                } else {
                    Some(sorted[mid])
                }
            }
        }
    }
}
