//! Bootstrap resampling of the unpaired mean difference.
//!
//! Each resample draws, with replacement, as many values as were observed
//! from each group independently and records
//! `mean(comparator*) − mean(baseline*)`. The point estimate is always the
//! observed difference of means; the resamples only shape the interval.

use super::interval::{bca_interval, jackknife_acceleration, percentile_interval};
use crate::data::{BootstrapResult, ConditionGroup, IntervalMethod};
use crate::error::{EstimationError, Result};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Minimum non-missing observations per group.
pub const MIN_GROUP_SIZE: usize = 2;

/// Configuration for bootstrap estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Number of bootstrap resamples.
    pub resamples: usize,
    /// Confidence level of the interval, in (0, 1).
    pub confidence_level: f64,
    /// Run seed; per-comparison seeds are derived from it.
    pub seed: u64,
    /// Interval method.
    pub interval: IntervalMethod,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            resamples: 5000,
            confidence_level: 0.95,
            seed: 12345,
            interval: IntervalMethod::Bca,
        }
    }
}

impl BootstrapConfig {
    /// Create a quick configuration for testing (fewer resamples).
    pub fn quick() -> Self {
        Self {
            resamples: 500,
            ..Default::default()
        }
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.resamples == 0 {
            return Err(EstimationError::InvalidParameter(
                "resamples must be at least 1".to_string(),
            ));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(EstimationError::InvalidParameter(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }
}

/// Numeric outcome of one bootstrap comparison.
#[derive(Debug, Clone)]
pub struct MeanDifference {
    /// Observed `mean(comparator) − mean(baseline)`.
    pub difference: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Interval method actually used.
    pub interval: IntervalMethod,
    /// Sorted resampled differences.
    pub distribution: Vec<f64>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn resample_mean<R: Rng>(rng: &mut R, values: &[f64]) -> f64 {
    let n = values.len();
    let sum: f64 = (0..n).map(|_| values[rng.gen_range(0..n)]).sum();
    sum / n as f64
}

/// Bootstrap the difference `mean(comparator) − mean(baseline)`.
///
/// Both slices hold present values only. The same inputs, configuration and
/// seed always give the same result.
///
/// # Errors
/// [`EstimationError::InvalidParameter`] for an invalid configuration or a
/// group with fewer than two values.
pub fn bootstrap_mean_diff(
    baseline: &[f64],
    comparator: &[f64],
    config: &BootstrapConfig,
    seed: u64,
) -> Result<MeanDifference> {
    config.validate()?;
    if baseline.len() < MIN_GROUP_SIZE || comparator.len() < MIN_GROUP_SIZE {
        return Err(EstimationError::InvalidParameter(format!(
            "bootstrap needs at least {} values per group, got {} and {}",
            MIN_GROUP_SIZE,
            baseline.len(),
            comparator.len()
        )));
    }

    let difference = mean(comparator) - mean(baseline);

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut distribution: Vec<f64> = (0..config.resamples)
        .map(|_| resample_mean(&mut rng, comparator) - resample_mean(&mut rng, baseline))
        .collect();
    distribution.sort_by(f64::total_cmp);

    let percentile = || percentile_interval(&distribution, config.confidence_level);
    let ((ci_lower, ci_upper), interval) = match config.interval {
        IntervalMethod::Percentile => (percentile(), IntervalMethod::Percentile),
        IntervalMethod::Bca => {
            let acceleration = jackknife_acceleration(baseline, comparator);
            match bca_interval(&distribution, difference, acceleration, config.confidence_level)? {
                Some(bounds) => (bounds, IntervalMethod::Bca),
                None => (percentile(), IntervalMethod::Percentile),
            }
        }
    };

    Ok(MeanDifference {
        difference,
        ci_lower,
        ci_upper,
        interval,
        distribution,
    })
}

/// Compare one comparator condition against the baseline of an entity.
///
/// # Errors
/// [`EstimationError::InsufficientSample`] when either group has fewer than
/// two present values.
pub fn compare_conditions(
    entity: &str,
    baseline: &ConditionGroup,
    comparator: &ConditionGroup,
    config: &BootstrapConfig,
    seed: u64,
) -> Result<BootstrapResult> {
    let baseline_values = baseline.values();
    let comparator_values = comparator.values();
    for (group, values) in [(baseline, &baseline_values), (comparator, &comparator_values)] {
        if values.len() < MIN_GROUP_SIZE {
            return Err(EstimationError::InsufficientSample {
                entity: entity.to_string(),
                condition: group.label.clone(),
                n: values.len(),
            });
        }
    }

    let estimate = bootstrap_mean_diff(&baseline_values, &comparator_values, config, seed)?;

    Ok(BootstrapResult {
        entity: entity.to_string(),
        baseline: baseline.label.clone(),
        comparator: comparator.label.clone(),
        baseline_n: baseline_values.len(),
        comparator_n: comparator_values.len(),
        difference: estimate.difference,
        ci_lower: estimate.ci_lower,
        ci_upper: estimate.ci_upper,
        resamples: config.resamples,
        confidence_level: config.confidence_level,
        interval: estimate.interval,
        bootstrap_distribution: estimate.distribution,
    })
}
