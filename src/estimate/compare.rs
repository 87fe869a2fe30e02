//! Baseline-versus-comparator estimation for a whole entity.

use super::bootstrap::{compare_conditions, BootstrapConfig};
use super::seed::derive_seed;
use crate::data::{BootstrapResult, ConditionGroup};
use crate::error::{EstimationError, Result};
use crate::filter::SanitizedEntity;
use log::warn;
use rayon::prelude::*;

/// A comparator whose comparison could not be estimated.
#[derive(Debug)]
pub struct ComparisonFailure {
    pub comparator: String,
    pub error: EstimationError,
}

/// All comparisons of one entity.
#[derive(Debug)]
pub struct EntityEstimate {
    pub entity: String,
    /// Successful comparisons, in comparator order.
    pub results: Vec<BootstrapResult>,
    /// Failed comparisons, in comparator order.
    pub failures: Vec<ComparisonFailure>,
}

impl EntityEstimate {
    /// Number of successful comparisons.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Get the result for a comparator.
    pub fn get(&self, comparator: &str) -> Option<&BootstrapResult> {
        self.results.iter().find(|r| r.comparator == comparator)
    }
}

/// Estimate every comparator of an entity against its baseline.
///
/// Comparator failures are collected, not raised. Seeds are derived per
/// comparator, so `parallel` does not change the results.
///
/// # Errors
/// [`EstimationError::NoEstimates`] when no comparison succeeds, and
/// configuration errors.
pub fn estimate_entity(
    entity: &SanitizedEntity,
    config: &BootstrapConfig,
    parallel: bool,
) -> Result<EntityEstimate> {
    config.validate()?;

    let baseline = entity.baseline();
    let compare = |comparator: &ConditionGroup| {
        let seed = derive_seed(config.seed, &entity.entity, &comparator.label);
        (
            comparator.label.clone(),
            compare_conditions(&entity.entity, baseline, comparator, config, seed),
        )
    };

    let outcomes: Vec<(String, Result<BootstrapResult>)> = if parallel {
        entity.comparators().par_iter().map(compare).collect()
    } else {
        entity.comparators().iter().map(compare).collect()
    };

    let mut results = Vec::new();
    let mut failures = Vec::new();
    for (comparator, outcome) in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(error) => {
                warn!(
                    "Entity '{}': comparison '{}' vs '{}' skipped: {}",
                    entity.entity, comparator, baseline.label, error
                );
                failures.push(ComparisonFailure { comparator, error });
            }
        }
    }

    if results.is_empty() {
        return Err(EstimationError::NoEstimates {
            entity: entity.entity.clone(),
        });
    }

    Ok(EntityEstimate {
        entity: entity.entity.clone(),
        results,
        failures,
    })
}
