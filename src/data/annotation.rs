//! Sample annotation: which condition each sample belongs to.

use crate::data::table::DelimitedTable;
use crate::error::{EstimationError, Result};
use log::warn;
use std::collections::HashMap;
use std::path::Path;

/// Column holding sample identifiers.
pub const SAMPLE_COLUMN: &str = "Sample";
/// Column holding condition labels.
pub const CONDITION_COLUMN: &str = "Condition";

/// Outcome of looking a sample up in the annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionLookup<'a> {
    /// The sample belongs to this condition.
    Mapped(&'a str),
    /// The sample is not annotated and takes no part in the analysis.
    Unmapped,
}

/// Mapping from sample identifier to condition label.
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    /// Sample IDs in first-appearance order.
    samples: Vec<String>,
    conditions: HashMap<String, String>,
}

impl AnnotationIndex {
    /// Build from (sample, condition) pairs.
    ///
    /// A sample listed twice keeps its first position and its last label.
    pub fn from_pairs<I, S, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: Into<String>,
    {
        let mut index = Self::default();
        for (sample, condition) in pairs {
            index.insert(sample.into(), condition.into());
        }
        index
    }

    fn insert(&mut self, sample: String, condition: String) {
        match self.conditions.insert(sample.clone(), condition) {
            Some(previous) => warn!(
                "Sample '{}' annotated more than once; replacing condition '{}' with '{}'",
                sample, previous, self.conditions[&sample]
            ),
            None => self.samples.push(sample),
        }
    }

    /// Read the `Sample` and `Condition` columns of a table as text.
    pub fn from_table(table: &DelimitedTable) -> Result<Self> {
        let samples = table.column(SAMPLE_COLUMN)?;
        let conditions = table.column(CONDITION_COLUMN)?;
        Ok(Self::from_pairs(
            samples
                .into_iter()
                .zip(conditions)
                .map(|(s, c)| (s.trim().to_string(), c.trim().to_string())),
        ))
    }

    /// Load from a `.txt`, `.tsv` or `.csv` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = DelimitedTable::from_path(path)?;
        let index = Self::from_table(&table)?;
        if index.is_empty() {
            return Err(EstimationError::EmptyData(
                "No samples in annotation".to_string(),
            ));
        }
        Ok(index)
    }

    /// Look up the condition of a sample.
    pub fn lookup(&self, sample: &str) -> ConditionLookup<'_> {
        match self.conditions.get(sample) {
            Some(condition) => ConditionLookup::Mapped(condition),
            None => ConditionLookup::Unmapped,
        }
    }

    /// Annotated sample IDs in first-appearance order.
    pub fn sample_ids(&self) -> &[String] {
        &self.samples
    }

    /// Distinct condition labels in first-appearance order.
    pub fn condition_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for sample in &self.samples {
            let label = self.conditions[sample].as_str();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Number of annotated samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
