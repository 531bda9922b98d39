#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/duplo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod boxed;
pub mod dummy;
pub mod error;
pub mod estimator;
pub mod frame;

pub use boxed::{BoxedClassifier, BoxedRegressor, DynClassifier, DynRegressor};
pub use dummy::{MeanRegressor, PriorClassifier};
pub use error::{CapabilityError, ModelError, Result};
pub use estimator::{Classifier, Dataset, Estimator, EstimatorKind, Regressor, ensure_kind};
pub use frame::{FrameRegressor, frame_to_matrix};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
