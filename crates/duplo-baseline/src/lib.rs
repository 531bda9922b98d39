#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/duplo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregation;
pub mod error;
pub mod regressor;
pub mod table;

pub use aggregation::Aggregation;
pub use error::{BaselineError, Result};
pub use regressor::{BaselineConfig, BaselineProportionalRegressor, ZeroBaselinePolicy};
pub use table::{BASELINE_COLUMN, BaselineLookup, BaselineTable};
