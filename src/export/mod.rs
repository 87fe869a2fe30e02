//! Result export: plot specifications, rendering, statistics tables and
//! output file naming.

pub mod naming;
pub mod plot_spec;
pub mod render;
pub mod stats;

pub use naming::{sanitize_file_stem, OutputPaths, StemSanitizer};
pub use plot_spec::{ConditionValues, FigureSize, PlotSpec};
pub use render::{PlotRenderer, SvgRenderer};
pub use stats::{read_stats_tsv, write_stats, write_stats_tsv, StatsRow};
