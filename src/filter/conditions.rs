//! Condition sanitizing: drop empty conditions and fix the comparison order.

use crate::data::{ConditionGroup, ConditionSequence, EntityGroup, Observation};
use crate::error::{EstimationError, Result};
use log::debug;
use std::collections::HashMap;

/// An entity's observations grouped by condition, in comparison order.
///
/// `groups[i]` belongs to `sequence[i]`; `groups[0]` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedEntity {
    pub entity: String,
    pub sequence: ConditionSequence,
    pub groups: Vec<ConditionGroup>,
}

impl SanitizedEntity {
    /// The baseline group.
    pub fn baseline(&self) -> &ConditionGroup {
        &self.groups[0]
    }

    /// Comparator groups, in order.
    pub fn comparators(&self) -> &[ConditionGroup] {
        &self.groups[1..]
    }

    /// Look up a group by label.
    pub fn group(&self, label: &str) -> Option<&ConditionGroup> {
        self.sequence.position(label).map(|i| &self.groups[i])
    }
}

/// Group an entity's records by condition and establish the condition order.
///
/// Conditions whose values are all missing are dropped. With an explicit
/// order, the result keeps only labels of that order still present, in that
/// order, and records of other conditions are discarded. Without one, the
/// remaining labels are used in first-appearance order.
///
/// # Errors
/// [`EstimationError::InsufficientConditions`] when fewer than two
/// conditions remain.
pub fn sanitize_conditions(
    group: EntityGroup,
    explicit_order: Option<&[String]>,
) -> Result<SanitizedEntity> {
    let entity = group.entity;

    let appearance = ConditionSequence::dedup(group.records.iter().map(|r| r.condition.clone()));
    let mut by_condition: HashMap<String, ConditionGroup> = HashMap::new();
    for record in group.records {
        by_condition
            .entry(record.condition.clone())
            .or_insert_with(|| ConditionGroup::new(record.condition.clone()))
            .observations
            .push(Observation {
                sample: record.sample,
                value: record.value,
            });
    }

    let non_empty = appearance.retain(|label| {
        let keep = by_condition.get(label).map_or(false, |g| !g.all_missing());
        if !keep {
            debug!("Entity '{}': dropping all-missing condition '{}'", entity, label);
        }
        keep
    });

    let sequence = match explicit_order {
        Some(order) if !order.is_empty() => {
            ConditionSequence::dedup(order.iter().cloned()).retain(|label| non_empty.contains(label))
        }
        _ => non_empty,
    };

    if sequence.len() < 2 {
        return Err(EstimationError::InsufficientConditions {
            entity,
            found: sequence.len(),
            conditions: sequence.into(),
        });
    }

    let groups = sequence
        .iter()
        .filter_map(|label| by_condition.remove(label))
        .collect();

    Ok(SanitizedEntity {
        entity,
        sequence,
        groups,
    })
}
