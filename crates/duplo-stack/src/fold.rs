//! Two-fold cross-fitting primitives
//!
//! - [`Fold`] names one of the two folds; [`Fold::other`] gives the fold whose
//!   models score it.
//! - [`FoldPair`] holds exactly one value per fold.
//! - [`FoldSplit`] is the row partition drawn once per fit.

use crate::error::{Result, StackError};
use derive_more::Display;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two cross-fitting folds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Fold {
    /// First fold
    #[display("A")]
    A,
    /// Second fold
    #[display("B")]
    B,
}

impl Fold {
    /// Both folds, in concatenation order
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// The opposite fold
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Exactly one value per fold
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldPair<T> {
    a: T,
    b: T,
}

impl<T> FoldPair<T> {
    /// Pair from explicit values
    pub const fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    /// Build each side from its fold
    pub fn from_fn(mut f: impl FnMut(Fold) -> T) -> Self {
        Self {
            a: f(Fold::A),
            b: f(Fold::B),
        }
    }

    /// Build each side from its fold, stopping at the first error
    pub fn try_from_fn<E>(
        mut f: impl FnMut(Fold) -> std::result::Result<T, E>,
    ) -> std::result::Result<Self, E> {
        Ok(Self {
            a: f(Fold::A)?,
            b: f(Fold::B)?,
        })
    }

    /// Transform both sides
    pub fn map<U>(self, mut f: impl FnMut(Fold, T) -> U) -> FoldPair<U> {
        FoldPair {
            a: f(Fold::A, self.a),
            b: f(Fold::B, self.b),
        }
    }

    /// Exchange the two sides
    pub fn swapped(self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }

    /// Iterate over `(fold, value)` in fold order
    pub fn iter(&self) -> impl Iterator<Item = (Fold, &T)> {
        [(Fold::A, &self.a), (Fold::B, &self.b)].into_iter()
    }
}

impl<T> Index<Fold> for FoldPair<T> {
    type Output = T;

    fn index(&self, fold: Fold) -> &T {
        match fold {
            Fold::A => &self.a,
            Fold::B => &self.b,
        }
    }
}

impl<T> IndexMut<Fold> for FoldPair<T> {
    fn index_mut(&mut self, fold: Fold) -> &mut T {
        match fold {
            Fold::A => &mut self.a,
            Fold::B => &mut self.b,
        }
    }
}

/// Partition of row indices into two non-empty, disjoint folds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit {
    indices: FoldPair<Vec<usize>>,
    n_rows: usize,
}

impl FoldSplit {
    /// Minimum number of rows for a split
    pub const MIN_ROWS: usize = 2;

    /// Random 50/50 split of `n_rows` rows
    ///
    /// Fold A receives `n_rows / 2` rows and fold B the rest. The split is not
    /// stratified. With a `seed` the split is reproducible, otherwise it is
    /// drawn from entropy.
    pub fn random(n_rows: usize, seed: Option<u64>) -> Result<Self> {
        if n_rows < Self::MIN_ROWS {
            return Err(StackError::TooFewSamples {
                required: Self::MIN_ROWS,
                actual: n_rows,
            });
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut a: Vec<usize> = (0..n_rows).collect();
        a.shuffle(&mut rng);
        let b = a.split_off(n_rows / 2);

        Ok(Self {
            indices: FoldPair::new(a, b),
            n_rows,
        })
    }

    /// Split from explicit row indices
    ///
    /// Together the two folds must contain each of `0..a.len() + b.len()`
    /// exactly once, and neither may be empty.
    pub fn from_indices(a: Vec<usize>, b: Vec<usize>) -> Result<Self> {
        let n_rows = a.len() + b.len();
        if a.is_empty() || b.is_empty() {
            return Err(StackError::InvalidSplit(
                "both folds need at least one row".to_string(),
            ));
        }

        let mut seen = vec![false; n_rows];
        for &row in a.iter().chain(b.iter()) {
            match seen.get_mut(row) {
                Some(flag) if !*flag => *flag = true,
                Some(_) => {
                    return Err(StackError::InvalidSplit(format!(
                        "row {row} appears more than once"
                    )));
                }
                None => {
                    return Err(StackError::InvalidSplit(format!(
                        "row {row} is out of range for {n_rows} rows"
                    )));
                }
            }
        }

        Ok(Self {
            indices: FoldPair::new(a, b),
            n_rows,
        })
    }

    /// Total number of rows
    pub const fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Row indices of `fold`
    pub fn indices(&self, fold: Fold) -> &[usize] {
        &self.indices[fold]
    }

    /// Number of rows in `fold`
    pub fn len(&self, fold: Fold) -> usize {
        self.indices[fold].len()
    }

    /// Rows of fold A followed by rows of fold B
    pub fn concatenated_order(&self) -> Vec<usize> {
        Fold::ALL
            .iter()
            .flat_map(|&fold| self.indices[fold].iter().copied())
            .collect()
    }

    /// Fold that contains `row`
    pub fn fold_of(&self, row: usize) -> Option<Fold> {
        Fold::ALL
            .into_iter()
            .find(|&fold| self.indices[fold].contains(&row))
    }

    /// Rows of `x` belonging to `fold`
    pub fn select_rows(&self, x: &Array2<f64>, fold: Fold) -> Array2<f64> {
        x.select(Axis(0), &self.indices[fold])
    }

    /// Entries of `values` belonging to `fold`
    pub fn select_values<T: Clone>(&self, values: ArrayView1<'_, T>, fold: Fold) -> Array1<T> {
        values.select(Axis(0), &self.indices[fold])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rstest::rstest;

    #[test]
    fn test_other_fold() {
        assert_eq!(Fold::A.other(), Fold::B);
        assert_eq!(Fold::B.other(), Fold::A);
        assert_eq!(Fold::A.other().other(), Fold::A);
    }

    #[test]
    fn test_fold_pair_indexing() {
        let mut pair = FoldPair::from_fn(|fold| fold.to_string());
        assert_eq!(pair[Fold::A], "A");
        pair[Fold::B].push('!');
        assert_eq!(pair[Fold::B], "B!");

        let swapped = pair.swapped();
        assert_eq!(swapped[Fold::A], "B!");

        let lengths = swapped.map(|_, s| s.len());
        assert_eq!(lengths, FoldPair::new(2, 1));
    }

    #[test]
    fn test_try_from_fn_stops_at_error() {
        let mut calls = Vec::new();
        let result: std::result::Result<FoldPair<u8>, Fold> = FoldPair::try_from_fn(|fold| {
            calls.push(fold);
            Err(fold)
        });
        assert_eq!(result, Err(Fold::A));
        assert_eq!(calls, vec![Fold::A]);
    }

    #[rstest]
    #[case(2, 1, 1)]
    #[case(7, 3, 4)]
    #[case(10, 5, 5)]
    fn test_random_split_sizes(#[case] n: usize, #[case] n_a: usize, #[case] n_b: usize) {
        let split = FoldSplit::random(n, Some(7)).unwrap();
        assert_eq!(split.len(Fold::A), n_a);
        assert_eq!(split.len(Fold::B), n_b);

        let mut all = split.concatenated_order();
        all.sort_unstable();
        assert_eq!(all, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_split_is_reproducible_with_seed() {
        let first = FoldSplit::random(50, Some(42)).unwrap();
        let second = FoldSplit::random(50, Some(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_split_rejects_tiny_input() {
        assert!(matches!(
            FoldSplit::random(1, None),
            Err(StackError::TooFewSamples {
                required: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_from_indices_validation() {
        assert!(FoldSplit::from_indices(vec![0, 2], vec![1]).is_ok());
        assert!(FoldSplit::from_indices(vec![], vec![0, 1]).is_err());
        assert!(FoldSplit::from_indices(vec![0, 0], vec![1]).is_err());
        assert!(FoldSplit::from_indices(vec![0, 5], vec![1]).is_err());
    }

    #[test]
    fn test_select_rows_and_values() {
        let split = FoldSplit::from_indices(vec![2, 0], vec![1]).unwrap();
        let x = array![[0.0, 0.5], [1.0, 1.5], [2.0, 2.5]];
        let y = array![10.0, 11.0, 12.0];

        assert_eq!(split.select_rows(&x, Fold::A), array![[2.0, 2.5], [0.0, 0.5]]);
        assert_eq!(split.select_values(y.view(), Fold::B), array![11.0]);
        assert_eq!(split.concatenated_order(), vec![2, 0, 1]);
        assert_eq!(split.fold_of(0), Some(Fold::A));
        assert_eq!(split.fold_of(1), Some(Fold::B));
        assert_eq!(split.fold_of(9), None);
    }
}
