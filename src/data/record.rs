//! Long-form measurement records.

use serde::{Deserialize, Serialize};

/// One measurement of one entity in one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRecord {
    /// Entity identifier (e.g. protein accession).
    pub entity: String,
    /// Sample identifier.
    pub sample: String,
    /// Measured value; `None` when missing.
    pub value: Option<f64>,
    /// Condition label of the sample.
    pub condition: String,
}

/// All long records of a single entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityGroup {
    pub entity: String,
    pub records: Vec<LongRecord>,
}

impl EntityGroup {
    pub fn new(entity: String) -> Self {
        Self {
            entity,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A sample's value within a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub sample: String,
    pub value: Option<f64>,
}

/// The observations of one condition for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGroup {
    pub label: String,
    pub observations: Vec<Observation>,
}

impl ConditionGroup {
    pub fn new(label: String) -> Self {
        Self {
            label,
            observations: Vec::new(),
        }
    }

    /// Present (non-missing) values, in observation order.
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().filter_map(|o| o.value).collect()
    }

    /// Number of present values.
    pub fn n_present(&self) -> usize {
        self.observations.iter().filter(|o| o.value.is_some()).count()
    }

    /// Number of missing values.
    pub fn n_missing(&self) -> usize {
        self.observations.len() - self.n_present()
    }

    /// True when every observation is missing (or there are none).
    pub fn all_missing(&self) -> bool {
        self.n_present() == 0
    }
}
