//! Ordered, duplicate-free condition sequences.

use crate::error::{EstimationError, Result};
use serde::{Deserialize, Serialize};

/// An ordered list of unique condition labels.
///
/// The first label is the baseline; every later label is a comparator
/// measured against it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ConditionSequence {
    labels: Vec<String>,
}

impl ConditionSequence {
    /// Create a sequence, rejecting repeated labels.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sequence = Self::default();
        for label in labels {
            let label = label.into();
            if sequence.contains(&label) {
                return Err(EstimationError::InvalidParameter(format!(
                    "Condition '{}' appears more than once",
                    label
                )));
            }
            sequence.labels.push(label);
        }
        Ok(sequence)
    }

    /// Create a sequence keeping only the first occurrence of each label.
    pub fn dedup<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sequence = Self::default();
        for label in labels {
            let label = label.into();
            if !sequence.contains(&label) {
                sequence.labels.push(label);
            }
        }
        sequence
    }

    /// The reference condition.
    pub fn baseline(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    /// Conditions compared against the baseline, in order.
    pub fn comparators(&self) -> &[String] {
        self.labels.get(1..).unwrap_or(&[])
    }

    /// Whether a label is part of the sequence.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Position of a label.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Keep only the labels accepted by `keep`, preserving order.
    pub fn retain<F: FnMut(&str) -> bool>(&self, mut keep: F) -> Self {
        Self {
            labels: self.labels.iter().filter(|l| keep(l.as_str())).cloned().collect(),
        }
    }

    /// Labels as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    /// Iterate over labels in order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConditionSequence {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

impl TryFrom<Vec<String>> for ConditionSequence {
    type Error = EstimationError;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        Self::new(labels)
    }
}

impl From<ConditionSequence> for Vec<String> {
    fn from(sequence: ConditionSequence) -> Self {
        sequence.labels
    }
}
