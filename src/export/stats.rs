//! Per-entity statistics tables.

use crate::data::BootstrapResult;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// One row of the statistics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    pub entity: String,
    pub comparator: String,
    pub baseline: String,
    pub difference: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub resamples: usize,
    pub confidence_level: f64,
}

impl StatsRow {
    pub fn from_result(result: &BootstrapResult) -> Self {
        Self {
            entity: result.entity.clone(),
            comparator: result.comparator.clone(),
            baseline: result.baseline.clone(),
            difference: result.difference,
            ci_lower: result.ci_lower,
            ci_upper: result.ci_upper,
            resamples: result.resamples,
            confidence_level: result.confidence_level,
        }
    }
}

/// Write rows as a tab-separated table with a header line.
pub fn write_stats<W: Write>(writer: W, rows: &[StatsRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(writer);
    if rows.is_empty() {
        wtr.write_record([
            "entity",
            "comparator",
            "baseline",
            "difference",
            "ci_lower",
            "ci_upper",
            "resamples",
            "confidence_level",
        ])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the statistics table of one entity to `path`.
pub fn write_stats_tsv(path: &Path, rows: &[StatsRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_stats(std::io::BufWriter::new(file), rows)
}

/// Read a statistics table back.
pub fn read_stats_tsv(path: &Path) -> Result<Vec<StatsRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
