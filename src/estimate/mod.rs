//! Bootstrap estimation of unpaired mean differences.
//!
//! Every comparator condition of an entity is compared with its baseline.
//! The point estimate is the observed difference of means; the confidence
//! interval comes from seeded bootstrap resampling, bias-corrected and
//! accelerated by default with a percentile fallback.

pub mod bootstrap;
pub mod compare;
pub mod interval;
pub mod seed;

pub use bootstrap::{bootstrap_mean_diff, compare_conditions, BootstrapConfig, MeanDifference};
pub use compare::{estimate_entity, ComparisonFailure, EntityEstimate};
pub use interval::{bca_interval, jackknife_acceleration, percentile_interval};
pub use seed::derive_seed;
