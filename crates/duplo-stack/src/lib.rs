#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/duplo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod fold;
pub mod layout;
pub mod regressor;

pub use error::{Result, StackError};
pub use fold::{Fold, FoldPair, FoldSplit};
pub use layout::AugmentedLayout;
pub use regressor::{QuantileStackedRegressor, StackConfig};
