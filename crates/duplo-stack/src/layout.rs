//! Augmented feature matrix layout
//!
//! Column order is fixed for both fit and predict:
//!
//! | columns                               | content                        |
//! |---------------------------------------|--------------------------------|
//! | `0 .. n_features`                     | original features              |
//! | `n_features .. n_features + n_cuts`   | propensity of `target > cut`   |
//! | `n_features + n_cuts .. width`        | auxiliary regressor prediction |

use crate::error::{Result, StackError};
use ndarray::{Array1, Array2, ArrayView2, s};
use serde::{Deserialize, Serialize};

/// Shape of the augmented feature matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentedLayout {
    /// Number of original feature columns
    pub n_features: usize,
    /// Number of propensity columns (one per cut)
    pub n_cuts: usize,
    /// Number of auxiliary regressor columns
    pub n_auxiliary: usize,
}

impl AugmentedLayout {
    /// Layout for the given column counts
    pub const fn new(n_features: usize, n_cuts: usize, n_auxiliary: usize) -> Self {
        Self {
            n_features,
            n_cuts,
            n_auxiliary,
        }
    }

    /// Total number of columns
    pub const fn width(&self) -> usize {
        self.n_features + self.n_cuts + self.n_auxiliary
    }

    /// Column holding the propensity for cut `index`
    pub const fn cut_column(&self, index: usize) -> usize {
        self.n_features + index
    }

    /// Column holding auxiliary regressor `index`
    pub const fn auxiliary_column(&self, index: usize) -> usize {
        self.n_features + self.n_cuts + index
    }

    /// Allocate the full matrix once and fill it by column index
    ///
    /// # Arguments
    /// * `features` - Original features (rows x `n_features`)
    /// * `cut_columns` - One column per cut, in cut order
    /// * `auxiliary_columns` - One column per auxiliary regressor, in list order
    pub fn assemble(
        &self,
        features: ArrayView2<'_, f64>,
        cut_columns: &[Array1<f64>],
        auxiliary_columns: &[Array1<f64>],
    ) -> Result<Array2<f64>> {
        let (n_rows, n_features) = features.dim();
        if n_features != self.n_features {
            return Err(StackError::DimensionMismatch {
                expected: self.n_features,
                actual: n_features,
            });
        }
        if cut_columns.len() != self.n_cuts {
            return Err(StackError::DimensionMismatch {
                expected: self.n_cuts,
                actual: cut_columns.len(),
            });
        }
        if auxiliary_columns.len() != self.n_auxiliary {
            return Err(StackError::DimensionMismatch {
                expected: self.n_auxiliary,
                actual: auxiliary_columns.len(),
            });
        }

        let mut augmented = Array2::zeros((n_rows, self.width()));
        augmented
            .slice_mut(s![.., ..self.n_features])
            .assign(&features);

        let engineered = cut_columns
            .iter()
            .enumerate()
            .map(|(i, column)| (self.cut_column(i), column))
            .chain(
                auxiliary_columns
                    .iter()
                    .enumerate()
                    .map(|(j, column)| (self.auxiliary_column(j), column)),
            );
        for (index, column) in engineered {
            if column.len() != n_rows {
                return Err(StackError::LengthMismatch {
                    what: "engineered column",
                    expected: n_rows,
                    actual: column.len(),
                });
            }
            augmented.column_mut(index).assign(column);
        }

        Ok(augmented)
    }
}
