//! Estimation statistics for per-entity condition comparisons
//!
//! This library computes bootstrap unpaired mean differences with confidence
//! intervals for many measured entities (e.g. proteins) across experimental
//! conditions, and exports one effect-size plot and one statistics table per
//! entity.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (tables, annotation, condition sequences, results)
//! - **group**: Entity selection and long-form reshaping
//! - **filter**: Condition sanitizing and ordering
//! - **transform**: Optional log2 transform
//! - **estimate**: Bootstrap mean differences with BCa/percentile intervals
//! - **export**: Plot specifications, SVG rendering, statistics tables
//! - **pipeline**: Per-entity driver and run configuration
//!
//! # Example
//!
//! ```no_run
//! use estimation_stats::prelude::*;
//! use std::path::Path;
//!
//! let table = MeasurementTable::from_path("proteins.tsv", "Protein").unwrap();
//! let annotation = AnnotationIndex::from_path("annotation.tsv").unwrap();
//!
//! let summary = Pipeline::new(["P12345", "Q67890"])
//!     .condition_order(["Control", "Treatment"])
//!     .log2(true)
//!     .resamples(5000)
//!     .run(&table, &annotation, Path::new("plots"))
//!     .unwrap();
//! println!("{}", summary);
//! ```

pub mod data;
pub mod error;
pub mod estimate;
pub mod export;
pub mod filter;
pub mod group;
pub mod pipeline;
pub mod transform;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{
        AnnotationIndex, BootstrapResult, ConditionLookup, ConditionSequence, DelimitedFormat,
        DelimitedTable, EntityGroup, IntervalMethod, LongRecord, MeasurementTable,
    };
    pub use crate::error::{EstimationError, Result};
    pub use crate::estimate::{
        bootstrap_mean_diff, estimate_entity, BootstrapConfig, EntityEstimate,
    };
    pub use crate::export::{
        sanitize_file_stem, write_stats_tsv, FigureSize, PlotRenderer, PlotSpec, StatsRow,
        SvgRenderer,
    };
    pub use crate::filter::{sanitize_conditions, SanitizedEntity};
    pub use crate::group::{group_entities, parse_list};
    pub use crate::pipeline::{
        run_estimation, EntityOutcome, EntityStage, EstimationConfig, Pipeline, RunOptions,
        RunSummary,
    };
    pub use crate::transform::{apply_transform, Transform};
}
