//! Effect-size results produced by the bootstrap estimator.

use serde::{Deserialize, Serialize};

/// How a confidence interval is derived from the bootstrap distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalMethod {
    /// Bias-corrected and accelerated.
    #[default]
    Bca,
    /// Plain percentile.
    Percentile,
}

impl IntervalMethod {
    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bca => "bca",
            Self::Percentile => "percentile",
        }
    }
}

impl std::str::FromStr for IntervalMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bca" => Ok(Self::Bca),
            "percentile" => Ok(Self::Percentile),
            other => Err(format!(
                "Unknown interval method '{}' (expected bca or percentile)",
                other
            )),
        }
    }
}

/// Unpaired mean difference of one comparator against the baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapResult {
    /// Entity identifier.
    pub entity: String,
    /// Reference condition.
    pub baseline: String,
    /// Condition compared against the baseline.
    pub comparator: String,
    /// Non-missing observations in the baseline.
    pub baseline_n: usize,
    /// Non-missing observations in the comparator.
    pub comparator_n: usize,
    /// Observed `mean(comparator) - mean(baseline)`.
    pub difference: f64,
    /// Lower confidence bound.
    pub ci_lower: f64,
    /// Upper confidence bound.
    pub ci_upper: f64,
    /// Number of bootstrap resamples.
    pub resamples: usize,
    /// Confidence level in (0, 1).
    pub confidence_level: f64,
    /// Interval method actually used (BCa may fall back to percentile).
    pub interval: IntervalMethod,
    /// Sorted resampled mean differences.
    #[serde(skip)]
    pub bootstrap_distribution: Vec<f64>,
}

impl BootstrapResult {
    /// Whether the interval excludes zero.
    pub fn excludes_zero(&self) -> bool {
        self.ci_lower > 0.0 || self.ci_upper < 0.0
    }
}
