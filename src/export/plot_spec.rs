//! Renderer-independent description of an estimation plot.

use crate::data::BootstrapResult;
use crate::estimate::EntityEstimate;
use crate::filter::SanitizedEntity;
use serde::{Deserialize, Serialize};

/// Output figure size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 500,
        }
    }
}

/// Observed values of one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionValues {
    pub label: String,
    pub values: Vec<f64>,
}

impl ConditionValues {
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Sample standard deviation; `None` below two values.
    pub fn std_dev(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        let mean = self.mean()?;
        let ss: f64 = self.values.iter().map(|v| (v - mean).powi(2)).sum();
        Some((ss / (n - 1) as f64).sqrt())
    }
}

/// Everything a renderer needs to draw one entity.
#[derive(Debug, Clone)]
pub struct PlotSpec {
    pub entity: String,
    /// Conditions in plot order; the first is the baseline.
    pub conditions: Vec<ConditionValues>,
    /// One result per successfully estimated comparator.
    pub results: Vec<BootstrapResult>,
    pub y_label: String,
    pub figure: FigureSize,
}

impl PlotSpec {
    pub fn from_estimates(
        entity: &SanitizedEntity,
        estimate: &EntityEstimate,
        y_label: &str,
        figure: FigureSize,
    ) -> Self {
        Self {
            entity: entity.entity.clone(),
            conditions: entity
                .groups
                .iter()
                .map(|g| ConditionValues {
                    label: g.label.clone(),
                    values: g.values(),
                })
                .collect(),
            results: estimate.results.clone(),
            y_label: y_label.to_string(),
            figure,
        }
    }

    pub fn baseline(&self) -> Option<&str> {
        self.conditions.first().map(|c| c.label.as_str())
    }

    /// Position of a condition in plot order.
    pub fn condition_index(&self, label: &str) -> Option<usize> {
        self.conditions.iter().position(|c| c.label == label)
    }

    /// Range covering every observed value, or `None` without values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        min_max(self.conditions.iter().flat_map(|c| c.values.iter().copied()))
    }

    /// Range covering zero, every interval and every bootstrap value.
    pub fn effect_range(&self) -> Option<(f64, f64)> {
        let values = self.results.iter().flat_map(|r| {
            r.bootstrap_distribution
                .iter()
                .copied()
                .chain([r.difference, r.ci_lower, r.ci_upper])
        });
        min_max(values.chain(std::iter::once(0.0)))
    }
}

fn min_max<I: Iterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_condition_summary() {
        let values = ConditionValues {
            label: "Ctrl".into(),
            values: vec![1.0, 2.0, 3.0],
        };
        assert_relative_eq!(values.mean().unwrap(), 2.0);
        assert_relative_eq!(values.std_dev().unwrap(), 1.0);

        let single = ConditionValues {
            label: "X".into(),
            values: vec![4.0],
        };
        assert!(single.std_dev().is_none());
    }

    #[test]
    fn test_ranges() {
        let spec = PlotSpec {
            entity: "P1".into(),
            conditions: vec![
                ConditionValues {
                    label: "Ctrl".into(),
                    values: vec![1.0, 5.0],
                },
                ConditionValues {
                    label: "Treat".into(),
                    values: vec![2.0, 7.0],
                },
            ],
            results: Vec::new(),
            y_label: "Value".into(),
            figure: FigureSize::default(),
        };
        assert_eq!(spec.value_range(), Some((1.0, 7.0)));
        assert_eq!(spec.effect_range(), Some((0.0, 0.0)));
        assert_eq!(spec.baseline(), Some("Ctrl"));
        assert_eq!(spec.condition_index("Treat"), Some(1));
    }
}
