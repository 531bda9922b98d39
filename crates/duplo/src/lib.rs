#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/duplo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export sub-crates
pub use duplo_baseline as baseline;
pub use duplo_core as estimator;
pub use duplo_stack as stack;

// Re-export the main types
pub use duplo_baseline::{BaselineConfig, BaselineProportionalRegressor, ZeroBaselinePolicy};
pub use duplo_core::{
    BoxedClassifier, BoxedRegressor, Classifier, Estimator, EstimatorKind, FrameRegressor,
    ModelError, Regressor,
};
pub use duplo_stack::{QuantileStackedRegressor, StackConfig};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
