//! Value transforms applied before estimation.

use crate::error::{EstimationError, Result};
use crate::filter::SanitizedEntity;
use serde::{Deserialize, Serialize};

/// Transform applied to every present value of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Values are used as measured.
    #[default]
    Identity,
    /// Values are replaced by their base-2 logarithm.
    Log2,
}

impl Transform {
    /// Pick the transform from a log2 flag.
    pub fn from_log2_flag(log2: bool) -> Self {
        if log2 {
            Self::Log2
        } else {
            Self::Identity
        }
    }

    /// Apply to a single value.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Log2 => value.log2(),
        }
    }

    /// Axis label for transformed values.
    pub fn value_label(&self) -> &'static str {
        match self {
            Self::Identity => "Value",
            Self::Log2 => "log2(Value)",
        }
    }
}

/// Transform every present value of an entity.
///
/// Missing values stay missing.
///
/// # Errors
/// [`EstimationError::NonFiniteValue`] for the first value that is not finite
/// after the transform (with log2, any value <= 0).
pub fn apply_transform(mut entity: SanitizedEntity, transform: Transform) -> Result<SanitizedEntity> {
    for group in &mut entity.groups {
        for observation in &mut group.observations {
            let Some(raw) = observation.value else {
                continue;
            };
            let transformed = transform.apply(raw);
            if !transformed.is_finite() {
                return Err(EstimationError::NonFiniteValue {
                    entity: entity.entity.clone(),
                    condition: group.label.clone(),
                    sample: observation.sample.clone(),
                    value: transformed,
                });
            }
            observation.value = Some(transformed);
        }
    }
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ConditionGroup, ConditionSequence, Observation};
    use approx::assert_relative_eq;

    fn create_entity(values: &[(&str, &str, Option<f64>)]) -> SanitizedEntity {
        let sequence = ConditionSequence::dedup(values.iter().map(|(c, _, _)| c.to_string()));
        let groups = sequence
            .iter()
            .map(|label| ConditionGroup {
                label: label.clone(),
                observations: values
                    .iter()
                    .filter(|(c, _, _)| *c == label.as_str())
                    .map(|(_, sample, value)| Observation {
                        sample: sample.to_string(),
                        value: *value,
                    })
                    .collect(),
            })
            .collect();
        SanitizedEntity {
            entity: "P1".to_string(),
            sequence,
            groups,
        }
    }

    #[test]
    fn test_log2_values() {
        let entity = create_entity(&[
            ("Ctrl", "S1", Some(8.0)),
            ("Ctrl", "S2", None),
            ("Treat", "S3", Some(0.5)),
        ]);
        let out = apply_transform(entity, Transform::Log2).unwrap();
        assert_relative_eq!(out.groups[0].observations[0].value.unwrap(), 3.0);
        assert_eq!(out.groups[0].observations[1].value, None);
        assert_relative_eq!(out.groups[1].observations[0].value.unwrap(), -1.0);
    }

    #[test]
    fn test_identity_keeps_values() {
        let entity = create_entity(&[("Ctrl", "S1", Some(0.0)), ("Treat", "S2", Some(-2.0))]);
        let out = apply_transform(entity.clone(), Transform::Identity).unwrap();
        assert_eq!(out, entity);
    }

    #[test]
    fn test_log2_of_zero_is_error() {
        let entity = create_entity(&[
            ("Ctrl", "S1", Some(1.0)),
            ("Treat", "S2", Some(2.0)),
            ("Treat", "S3", Some(0.0)),
        ]);
        let err = apply_transform(entity, Transform::Log2).unwrap_err();
        match err {
            EstimationError::NonFiniteValue {
                entity,
                condition,
                sample,
                value,
            } => {
                assert_eq!(entity, "P1");
                assert_eq!(condition, "Treat");
                assert_eq!(sample, "S3");
                assert!(value.is_infinite());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_log2_of_negative_is_error() {
        let entity = create_entity(&[("Ctrl", "S1", Some(-1.0)), ("Treat", "S2", Some(2.0))]);
        assert!(matches!(
            apply_transform(entity, Transform::Log2),
            Err(EstimationError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_value_label() {
        assert_eq!(Transform::from_log2_flag(true).value_label(), "log2(Value)");
        assert_eq!(Transform::from_log2_flag(false).value_label(), "Value");
    }
}
