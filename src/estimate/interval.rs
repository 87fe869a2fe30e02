//! Confidence intervals from a bootstrap distribution.
//!
//! # Percentile
//!
//! The bounds are the `α/2` and `1 − α/2` order statistics of the sorted
//! bootstrap distribution.
//!
//! # Bias-corrected and accelerated (BCa)
//!
//! 1. Bias: `z0 = Φ⁻¹(#{b < estimate} / B)`
//! 2. Acceleration from the two-sample jackknife:
//!    `a = Σd³ / (6 (Σd²)^{3/2})` with `d = mean(jk) − jk`
//! 3. Adjusted percentiles: `Φ(z0 + (z0 + z) / (1 − a (z0 + z)))` for
//!    `z = Φ⁻¹(α/2)` and `z = Φ⁻¹(1 − α/2)`
//!
//! Order statistics are taken at `floor(p · B)`, clamped to `[0, B − 1]`.

use crate::error::{EstimationError, Result};
use log::debug;
use statrs::distribution::{ContinuousCDF, Normal};

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| EstimationError::InvalidParameter(e.to_string()))
}

/// Order statistic of a sorted sample at probability `p`.
pub fn order_statistic(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let last = sorted.len() - 1;
    let idx = (p * sorted.len() as f64).floor();
    let idx = if idx.is_nan() || idx < 0.0 {
        0
    } else {
        (idx as usize).min(last)
    };
    sorted[idx]
}

/// Percentile interval at the given confidence level.
pub fn percentile_interval(sorted: &[f64], confidence_level: f64) -> (f64, f64) {
    let alpha = 1.0 - confidence_level;
    (
        order_statistic(sorted, alpha / 2.0),
        order_statistic(sorted, 1.0 - alpha / 2.0),
    )
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Jackknife acceleration of the unpaired mean difference.
///
/// Each observation of either group is left out once; the statistic is
/// recomputed with the other group intact. Returns NaN when every jackknife
/// value is identical.
pub fn jackknife_acceleration(baseline: &[f64], comparator: &[f64]) -> f64 {
    let (nb, nc) = (baseline.len(), comparator.len());
    if nb < 2 || nc < 2 {
        return f64::NAN;
    }
    let (sum_b, sum_c) = (baseline.iter().sum::<f64>(), comparator.iter().sum::<f64>());
    let (mean_b, mean_c) = (sum_b / nb as f64, sum_c / nc as f64);

    let jackknife: Vec<f64> = baseline
        .iter()
        .map(|x| mean_c - (sum_b - x) / (nb - 1) as f64)
        .chain(comparator.iter().map(|x| (sum_c - x) / (nc - 1) as f64 - mean_b))
        .collect();

    let jk_mean = mean(&jackknife);
    let (sum_sq, sum_cube) = jackknife.iter().fold((0.0, 0.0), |(sq, cube), jk| {
        let d = jk_mean - jk;
        (sq + d * d, cube + d * d * d)
    });

    sum_cube / (6.0 * sum_sq.powf(1.5))
}

/// BCa interval, or `None` when the distribution is degenerate and the
/// percentile interval should be used instead.
pub fn bca_interval(
    sorted: &[f64],
    estimate: f64,
    acceleration: f64,
    confidence_level: f64,
) -> Result<Option<(f64, f64)>> {
    let b = sorted.len();
    let below = sorted.iter().filter(|&&x| x < estimate).count();
    if b == 0 || below == 0 || below == b {
        debug!("BCa bias undefined ({} of {} below estimate)", below, b);
        return Ok(None);
    }
    if !acceleration.is_finite() {
        debug!("BCa acceleration undefined");
        return Ok(None);
    }

    let normal = standard_normal()?;
    let z0 = normal.inverse_cdf(below as f64 / b as f64);
    let alpha = 1.0 - confidence_level;

    let adjust = |z: f64| -> Option<f64> {
        let denom = 1.0 - acceleration * (z0 + z);
        if denom <= 0.0 {
            return None;
        }
        let p = normal.cdf(z0 + (z0 + z) / denom);
        p.is_finite().then_some(p)
    };

    let (Some(p_lo), Some(p_hi)) = (
        adjust(normal.inverse_cdf(alpha / 2.0)),
        adjust(normal.inverse_cdf(1.0 - alpha / 2.0)),
    ) else {
        return Ok(None);
    };
    if p_lo > p_hi {
        return Ok(None);
    }

    debug!(
        "BCa z0={:.4} a={:.4} percentiles=({:.4}, {:.4})",
        z0, acceleration, p_lo, p_hi
    );
    Ok(Some((
        order_statistic(sorted, p_lo),
        order_statistic(sorted, p_hi),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform_grid(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_order_statistic_clamps() {
        let sorted = uniform_grid(10);
        assert_eq!(order_statistic(&sorted, 0.0), 0.0);
        assert_eq!(order_statistic(&sorted, 0.25), 2.0);
        assert_eq!(order_statistic(&sorted, 1.0), 9.0);
        assert_eq!(order_statistic(&sorted, -0.5), 0.0);
        assert!(order_statistic(&[], 0.5).is_nan());
    }

    #[test]
    fn test_percentile_interval() {
        let sorted = uniform_grid(1000);
        let (lo, hi) = percentile_interval(&sorted, 0.95);
        assert!((lo - 25.0).abs() <= 1.0);
        assert!((hi - 975.0).abs() <= 1.0);
    }

    #[test]
    fn test_acceleration_symmetric_is_zero() {
        let a = jackknife_acceleration(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_relative_eq!(a, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_acceleration_skewed_is_nonzero() {
        let a = jackknife_acceleration(&[1.0, 1.0, 1.0, 1.0], &[1.0, 1.0, 2.0, 20.0]);
        assert!(a.is_finite());
        assert!(a.abs() > 0.01);
    }

    #[test]
    fn test_acceleration_constant_is_nan() {
        assert!(jackknife_acceleration(&[2.0, 2.0], &[3.0, 3.0]).is_nan());
    }

    #[test]
    fn test_bca_matches_percentile_without_bias_or_skew() {
        // Symmetric grid with the estimate at its centre: z0 = 0.
        let sorted = uniform_grid(1000);
        let (lo, hi) = bca_interval(&sorted, 499.5, 0.0, 0.95).unwrap().unwrap();
        let (p_lo, p_hi) = percentile_interval(&sorted, 0.95);
        assert!((lo - p_lo).abs() <= 1.0);
        assert!((hi - p_hi).abs() <= 1.0);
    }

    #[test]
    fn test_bca_degenerate_falls_back() {
        let sorted = vec![1.0; 100];
        assert_eq!(bca_interval(&sorted, 1.0, 0.0, 0.95).unwrap(), None);

        let sorted = uniform_grid(100);
        assert_eq!(bca_interval(&sorted, 200.0, 0.0, 0.95).unwrap(), None);
        assert_eq!(bca_interval(&sorted, 50.0, f64::NAN, 0.95).unwrap(), None);
    }

    #[test]
    fn test_bca_is_ordered() {
        let sorted = uniform_grid(500);
        let (lo, hi) = bca_interval(&sorted, 180.0, 0.05, 0.9).unwrap().unwrap();
        assert!(lo <= hi);
    }
}
