//! Select requested entities and reshape them to long form.

use crate::data::{AnnotationIndex, Cell, ConditionLookup, EntityGroup, LongRecord, MeasurementTable};
use crate::error::{EstimationError, Result};
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

/// Identifier values included in a no-match diagnostic.
pub const DIAGNOSTIC_ID_COUNT: usize = 20;

/// Trim, drop empties and de-duplicate a requested identifier list.
pub fn normalize_entity_list<I, S>(requested: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    requested
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Parse a comma-separated list (entities or condition order).
pub fn parse_list(raw: &str) -> Vec<String> {
    normalize_entity_list(raw.split(','))
}

/// Group the requested entities of a measurement table into long records.
///
/// Every row whose identifier is requested contributes one record per
/// annotated sample column, so each group holds
/// `matching rows × mapped samples` records. Records are ordered by
/// annotation sample order, then by row order. Groups are returned sorted
/// by identifier.
///
/// # Errors
/// [`EstimationError::NoMatch`] when no identifier in the table is requested.
pub fn group_entities(
    table: &MeasurementTable,
    annotation: &AnnotationIndex,
    requested: &[String],
) -> Result<Vec<EntityGroup>> {
    let requested = normalize_entity_list(requested);
    let wanted: HashSet<&str> = requested.iter().map(String::as_str).collect();

    let matching_rows: Vec<usize> = table
        .entity_ids()
        .iter()
        .enumerate()
        .filter(|(_, id)| wanted.contains(id.as_str()))
        .map(|(row, _)| row)
        .collect();

    if matching_rows.is_empty() {
        return Err(EstimationError::NoMatch {
            index_column: table.index_column().to_string(),
            requested,
            observed_sample: table.head_ids(DIAGNOSTIC_ID_COUNT),
        });
    }

    let found: HashSet<&str> = matching_rows
        .iter()
        .map(|&row| table.entity_ids()[row].as_str())
        .collect();
    for id in &requested {
        if !found.contains(id.as_str()) {
            warn!(
                "Requested entity '{}' not found in '{}' column",
                id,
                table.index_column()
            );
        }
    }

    let mapped = mapped_samples(table, annotation);
    debug!(
        "{} matching row(s), {} annotated sample column(s)",
        matching_rows.len(),
        mapped.len()
    );

    let mut groups: BTreeMap<String, EntityGroup> = BTreeMap::new();
    for (col, sample, condition) in &mapped {
        for &row in &matching_rows {
            let entity = &table.entity_ids()[row];
            let value = match table.cell(row, *col) {
                Cell::Number(v) => Some(*v),
                Cell::Missing => None,
                Cell::Text(text) => {
                    warn!(
                        "Non-numeric value '{}' for entity '{}' in sample '{}' treated as missing",
                        text, entity, sample
                    );
                    None
                }
            };
            groups
                .entry(entity.clone())
                .or_insert_with(|| EntityGroup::new(entity.clone()))
                .records
                .push(LongRecord {
                    entity: entity.clone(),
                    sample: sample.to_string(),
                    value,
                    condition: condition.to_string(),
                });
        }
    }

    // Entities with no annotated sample column still get an (empty) group.
    for &row in &matching_rows {
        let entity = &table.entity_ids()[row];
        groups
            .entry(entity.clone())
            .or_insert_with(|| EntityGroup::new(entity.clone()));
    }

    Ok(groups.into_values().collect())
}

/// Annotated samples present in the table, as (column, sample, condition).
fn mapped_samples<'a>(
    table: &MeasurementTable,
    annotation: &'a AnnotationIndex,
) -> Vec<(usize, &'a str, &'a str)> {
    annotation
        .sample_ids()
        .iter()
        .filter_map(|sample| {
            let condition = match annotation.lookup(sample) {
                ConditionLookup::Mapped(condition) => condition,
                ConditionLookup::Unmapped => return None,
            };
            match table.sample_position(sample) {
                Some(col) => Some((col, sample.as_str(), condition)),
                None => {
                    warn!(
                        "Annotated sample '{}' is not a column of the measurement table; skipping",
                        sample
                    );
                    None
                }
            }
        })
        .collect()
}
