//! Pipeline configuration and execution for estimation runs.

mod config;
mod runner;

pub use config::EstimationConfig;
pub use runner::{
    run_estimation, EntityOutcome, EntityStage, Pipeline, RunOptions, RunSummary,
    SkippedComparison,
};
