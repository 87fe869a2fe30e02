//! Per-entity pipeline driver.
//!
//! Every requested entity moves through
//! `Pending → Grouped → Sanitized → Transformed → Estimated → Exported`.
//! A failure at any point stops only that entity; it is logged with the
//! stage it had reached and recorded in the [`RunSummary`].

use super::config::EstimationConfig;
use crate::data::{AnnotationIndex, DelimitedFormat, DelimitedTable, EntityGroup, IntervalMethod, MeasurementTable};
use crate::error::{EstimationError, Result};
use crate::estimate::{estimate_entity, BootstrapConfig};
use crate::export::{
    write_stats, FigureSize, OutputPaths, PlotRenderer, PlotSpec, StatsRow, StemSanitizer,
    SvgRenderer,
};
use crate::filter::sanitize_conditions;
use crate::group::{group_entities, normalize_entity_list, DIAGNOSTIC_ID_COUNT};
use crate::transform::{apply_transform, Transform};
use log::{error, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Progress of one entity through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStage {
    Pending,
    Grouped,
    Sanitized,
    Transformed,
    Estimated,
    Exported,
}

impl EntityStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Grouped => "grouped",
            Self::Sanitized => "sanitized",
            Self::Transformed => "transformed",
            Self::Estimated => "estimated",
            Self::Exported => "exported",
        }
    }
}

impl fmt::Display for EntityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A comparator that was skipped for an exported entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedComparison {
    pub comparator: String,
    pub cause: String,
}

/// Terminal state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EntityOutcome {
    Exported {
        entity: String,
        plot: PathBuf,
        stats: PathBuf,
        comparisons: usize,
        skipped: Vec<SkippedComparison>,
    },
    Failed {
        entity: String,
        /// Last stage the entity reached before failing.
        stage: EntityStage,
        cause: String,
    },
}

impl EntityOutcome {
    pub fn entity(&self) -> &str {
        match self {
            Self::Exported { entity, .. } | Self::Failed { entity, .. } => entity,
        }
    }

    pub fn is_exported(&self) -> bool {
        matches!(self, Self::Exported { .. })
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Distinct requested identifiers.
    pub requested: usize,
    /// Requested identifiers found in the table.
    pub matched: usize,
    /// Per-entity outcomes, sorted by identifier.
    pub outcomes: Vec<EntityOutcome>,
}

impl RunSummary {
    /// Number of entities whose plot and stats table were written.
    pub fn exported(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_exported()).count()
    }

    /// Outcomes of failed entities.
    pub fn failures(&self) -> Vec<&EntityOutcome> {
        self.outcomes.iter().filter(|o| !o.is_exported()).collect()
    }

    pub fn get(&self, entity: &str) -> Option<&EntityOutcome> {
        self.outcomes.iter().find(|o| o.entity() == entity)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(EstimationError::from)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated {} plot(s) for {} requested entit{} ({} matched, {} failed)",
            self.exported(),
            self.requested,
            if self.requested == 1 { "y" } else { "ies" },
            self.matched,
            self.failures().len()
        )
    }
}

/// Builder for estimation runs.
#[derive(Clone)]
pub struct Pipeline {
    entities: Vec<String>,
    condition_order: Vec<String>,
    transform: Transform,
    bootstrap: BootstrapConfig,
    figure: FigureSize,
    parallel: bool,
    renderer: Arc<dyn PlotRenderer>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("entities", &self.entities)
            .field("condition_order", &self.condition_order)
            .field("transform", &self.transform)
            .field("bootstrap", &self.bootstrap)
            .field("figure", &self.figure)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline for the given entity identifiers.
    pub fn new<I, S>(entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_config(&EstimationConfig::default(), entities)
    }

    /// Create from a config.
    pub fn from_config<I, S>(config: &EstimationConfig, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entities: normalize_entity_list(entities),
            condition_order: normalize_entity_list(&config.condition_order),
            transform: config.transform(),
            bootstrap: config.bootstrap.clone(),
            figure: config.figure,
            parallel: config.parallel,
            renderer: Arc::new(SvgRenderer::default()),
        }
    }

    /// Fix the condition order; the first present label is the baseline.
    pub fn condition_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.condition_order = normalize_entity_list(order);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Log2-transform values before estimation.
    pub fn log2(self, enabled: bool) -> Self {
        self.transform(Transform::from_log2_flag(enabled))
    }

    pub fn bootstrap(mut self, config: BootstrapConfig) -> Self {
        self.bootstrap = config;
        self
    }

    pub fn resamples(mut self, resamples: usize) -> Self {
        self.bootstrap.resamples = resamples;
        self
    }

    pub fn confidence_level(mut self, level: f64) -> Self {
        self.bootstrap.confidence_level = level;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.bootstrap.seed = seed;
        self
    }

    pub fn interval(mut self, interval: IntervalMethod) -> Self {
        self.bootstrap.interval = interval;
        self
    }

    pub fn figure(mut self, figure: FigureSize) -> Self {
        self.figure = figure;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replace the plot renderer.
    pub fn renderer(mut self, renderer: Arc<dyn PlotRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Export the settings as a config.
    pub fn to_config(&self) -> EstimationConfig {
        EstimationConfig {
            bootstrap: self.bootstrap.clone(),
            log2: self.transform == Transform::Log2,
            condition_order: self.condition_order.clone(),
            parallel: self.parallel,
            figure: self.figure,
        }
    }

    /// Estimate, plot and export every requested entity.
    ///
    /// Returns a summary with zero exports, and creates no directory, when
    /// none of the requested entities is in the table.
    ///
    /// # Errors
    /// Invalid settings and failure to create `output_dir`. Per-entity
    /// failures are recorded in the summary instead.
    pub fn run(
        &self,
        table: &MeasurementTable,
        annotation: &AnnotationIndex,
        output_dir: &Path,
    ) -> Result<RunSummary> {
        self.bootstrap.validate()?;
        let requested = self.entities.len();
        info!("Looking for these entities: {:?}", self.entities);

        let groups = match group_entities(table, annotation, &self.entities) {
            Ok(groups) => groups,
            Err(EstimationError::NoMatch {
                index_column,
                requested: ids,
                observed_sample,
            }) => {
                error!("No data left after filtering! Check if the selected entities exist in the data.");
                error!("Selected entities that were searched for: {:?}", ids);
                error!("None of the selected entities were found in the '{}' column.", index_column);
                error!("First {} actual values in '{}':", DIAGNOSTIC_ID_COUNT, index_column);
                for (i, id) in observed_sample.iter().enumerate() {
                    error!("  {}. {}", i + 1, id);
                }
                return Ok(RunSummary {
                    requested,
                    ..Default::default()
                });
            }
            Err(e) => return Err(e),
        };
        info!("{} entit(ies) matched", groups.len());

        std::fs::create_dir_all(output_dir)
            .map_err(|e| EstimationError::write(output_dir, e.into()))?;
        info!("Created output folder: {}", output_dir.display());

        let sanitizer = StemSanitizer::new()?;
        let mut stems = sanitizer.assign_stems(groups.iter().map(|g| g.entity.as_str()));
        for (stem, ids) in sanitizer.collisions(groups.iter().map(|g| g.entity.as_str())) {
            let renamed: Vec<String> = ids
                .iter()
                .filter_map(|id| stems.get(id).map(|s| format!("{} -> {}", id, s)))
                .collect();
            warn!("Entities {:?} share the file stem '{}'; writing {:?}", ids, stem, renamed);
        }
        let work: Vec<(EntityGroup, String)> = groups
            .into_iter()
            .map(|group| {
                let stem = stems
                    .remove(&group.entity)
                    .unwrap_or_else(|| sanitizer.stem(&group.entity));
                (group, stem)
            })
            .collect();

        let matched = work.len();
        let outcomes: Vec<EntityOutcome> = if self.parallel {
            work.into_par_iter()
                .map(|(group, stem)| self.process_entity(group, &OutputPaths::new(output_dir, &stem)))
                .collect()
        } else {
            work.into_iter()
                .map(|(group, stem)| self.process_entity(group, &OutputPaths::new(output_dir, &stem)))
                .collect()
        };

        let summary = RunSummary {
            requested,
            matched,
            outcomes,
        };
        info!("Completed! {} in {}", summary, output_dir.display());
        Ok(summary)
    }

    fn process_entity(&self, group: EntityGroup, paths: &OutputPaths) -> EntityOutcome {
        let entity = group.entity.clone();
        info!("Processing entity: {}", entity);

        let mut stage = EntityStage::Pending;
        match self.advance(group, paths, &mut stage) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "Entity '{}' failed after stage '{}': {}",
                    entity, stage, e
                );
                EntityOutcome::Failed {
                    entity,
                    stage,
                    cause: e.to_string(),
                }
            }
        }
    }

    fn advance(
        &self,
        group: EntityGroup,
        paths: &OutputPaths,
        stage: &mut EntityStage,
    ) -> Result<EntityOutcome> {
        let entity = group.entity.clone();
        *stage = EntityStage::Grouped;

        let sanitized = sanitize_conditions(group, Some(self.condition_order.as_slice()))?;
        *stage = EntityStage::Sanitized;
        info!("Conditions for {}: {:?}", entity, sanitized.sequence.as_slice());

        let transformed = apply_transform(sanitized, self.transform)?;
        *stage = EntityStage::Transformed;

        let estimate = estimate_entity(&transformed, &self.bootstrap, self.parallel)?;
        *stage = EntityStage::Estimated;

        let spec = PlotSpec::from_estimates(
            &transformed,
            &estimate,
            self.transform.value_label(),
            self.figure,
        );
        let image = self.renderer.render(&spec)?;
        let rows: Vec<StatsRow> = estimate.results.iter().map(StatsRow::from_result).collect();
        let mut table = Vec::new();
        write_stats(&mut table, &rows)?;

        write_artifacts(paths, &image, &table)?;
        info!("Saved plot: {}", paths.plot.display());
        info!("Saved stats: {}", paths.stats.display());
        *stage = EntityStage::Exported;

        Ok(EntityOutcome::Exported {
            entity,
            plot: paths.plot.clone(),
            stats: paths.stats.clone(),
            comparisons: estimate.results.len(),
            skipped: estimate
                .failures
                .iter()
                .map(|f| SkippedComparison {
                    comparator: f.comparator.clone(),
                    cause: f.error.to_string(),
                })
                .collect(),
        })
    }
}

/// Write the stats table and then the plot.
///
/// If the plot cannot be written the stats table is removed again, so an
/// entity leaves both files or neither.
fn write_artifacts(paths: &OutputPaths, image: &[u8], table: &[u8]) -> Result<()> {
    std::fs::write(&paths.stats, table)
        .map_err(|e| EstimationError::write(&paths.stats, e.into()))?;
    if let Err(e) = std::fs::write(&paths.plot, image) {
        if let Err(cleanup) = std::fs::remove_file(&paths.stats) {
            warn!("Could not remove {}: {}", paths.stats.display(), cleanup);
        }
        return Err(EstimationError::write(&paths.plot, e.into()));
    }
    Ok(())
}

/// Input files and settings of a complete run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub file_path: PathBuf,
    pub index_column: String,
    pub entities: Vec<String>,
    pub sample_annotation: PathBuf,
    pub output_dir: PathBuf,
    pub config: EstimationConfig,
}

/// Load both input tables and run the pipeline.
///
/// Both file formats are checked before anything is read.
///
/// # Errors
/// Unsupported formats, unreadable inputs and missing columns.
pub fn run_estimation(options: &RunOptions) -> Result<RunSummary> {
    info!("Starting with parameters:");
    info!("  file_path: {}", options.file_path.display());
    info!("  index_col: {}", options.index_column);
    info!("  selected entities: {:?}", options.entities);
    info!("  sample_annotation: {}", options.sample_annotation.display());
    info!("  output_folder: {}", options.output_dir.display());
    info!("  log2: {}", options.config.log2);
    info!("  condition_order: {:?}", options.config.condition_order);
    info!(
        "  bootstrap: {} resamples, level {}, seed {}, {} interval",
        options.config.bootstrap.resamples,
        options.config.bootstrap.confidence_level,
        options.config.bootstrap.seed,
        options.config.bootstrap.interval.name()
    );

    DelimitedFormat::from_path(&options.file_path)?;
    DelimitedFormat::from_path(&options.sample_annotation)?;

    let raw = DelimitedTable::from_path(&options.file_path)?;
    info!("Loaded data with shape: ({}, {})", raw.n_rows(), raw.n_columns());
    info!("Columns: {:?}", raw.headers());
    let table = MeasurementTable::from_table(&raw, &options.index_column)?;
    info!(
        "Index column '{}' unique values: {}",
        options.index_column,
        table.n_unique_entities()
    );
    info!("Sample values from '{}' column:", options.index_column);
    for (i, id) in table.head_ids(DIAGNOSTIC_ID_COUNT).iter().enumerate() {
        info!("  {}. {}", i + 1, id);
    }

    let annotation = AnnotationIndex::from_path(&options.sample_annotation)?;
    info!("Sample annotation loaded: {} samples", annotation.len());

    Pipeline::from_config(&options.config, &options.entities).run(
        &table,
        &annotation,
        &options.output_dir,
    )
}
