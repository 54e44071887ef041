//! Summary statistics for comparison-count estimates.
//!
//! Reduces the per-trial counts of a Monte Carlo run to the figures the
//! report prints: mean, sample standard deviation (`n - 1` denominator),
//! standard error, a two-sided confidence interval at a chosen z-score, and the
//! mean as a percentage of the naive comparison count.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;

/// z-score for a two-sided 99% interval, rounded as the reports quote it.
pub const DEFAULT_Z: f64 = 2.58;

/// z-score of a two-sided confidence interval at `level` (e.g. 0.95 → 1.96).
///
/// Returns `None` unless `0 < level < 1`.
pub fn z_for_confidence(level: f64) -> Option<f64> {
    if !(level > 0.0 && level < 1.0) {
        return None;
    }
    let norm = Normal::standard();
    Some(norm.inverse_cdf(1.0 - (1.0 - level) / 2.0))
}

/// Reduced view of one batch of trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation; 0 for a single trial.
    pub std_dev: f64,
    pub std_error: f64,
    pub z: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Comparisons needed without closure.
    pub naive: usize,
    /// `mean / naive`.
    pub ratio: f64,
}

impl Summary {
    /// Summarize per-trial comparison counts. `None` for an empty slice.
    pub fn from_counts(counts: &[usize], z: f64, naive: usize) -> Option<Self> {
        let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
        Self::from_values(&values, z, naive)
    }

    pub fn from_values(values: &[f64], z: f64, naive: usize) -> Option<Self> {
        let n = values.len();
        if n == 0 {
            return None;
        }
        let mean = values.mean();
        let std_dev = if n > 1 { values.std_dev() } else { 0.0 };
        let std_error = std_dev / (n as f64).sqrt();
        Some(Self {
            n,
            mean,
            std_dev,
            std_error,
            z,
            ci_lower: mean - z * std_error,
            ci_upper: mean + z * std_error,
            naive,
            ratio: mean / naive as f64,
        })
    }

    /// Mean as a percentage of the naive comparison count.
    pub fn percent_of_naive(&self) -> f64 {
        100.0 * self.ratio
    }

    /// Confidence level the z-score corresponds to (two-sided).
    pub fn confidence_level(&self) -> f64 {
        let norm = Normal::standard();
        2.0 * norm.cdf(self.z) - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_counts() {
        let s = Summary::from_counts(&[4, 4, 4, 4], DEFAULT_Z, 4).unwrap();
        assert_eq!(s.mean, 4.0);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.ci_lower, 4.0);
        assert_eq!(s.ci_upper, 4.0);
        assert_eq!(s.ratio, 1.0);
        assert_eq!(s.percent_of_naive(), 100.0);
    }

    #[test]
    fn test_sample_std_dev_uses_n_minus_one() {
        // mean 5, squared deviations sum to 32, /7 → var 32/7
        let s = Summary::from_counts(&[2, 4, 4, 4, 5, 5, 7, 9], 1.96, 100).unwrap();
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.std_dev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!((s.std_error - s.std_dev / 8f64.sqrt()).abs() < 1e-12);
        assert!((s.ci_upper - s.mean - 1.96 * s.std_error).abs() < 1e-12);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(Summary::from_counts(&[], DEFAULT_Z, 10).is_none());
        let s = Summary::from_counts(&[7], DEFAULT_Z, 10).unwrap();
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.n, 1);
    }

    #[test]
    fn test_z_for_confidence() {
        assert!((z_for_confidence(0.95).unwrap() - 1.959964).abs() < 1e-5);
        assert!((z_for_confidence(0.99).unwrap() - 2.575829).abs() < 1e-5);
        assert!(z_for_confidence(1.0).is_none());
        assert!(z_for_confidence(0.0).is_none());
        assert!(z_for_confidence(f64::NAN).is_none());
    }

    #[test]
    fn test_confidence_level_round_trip() {
        let s = Summary::from_counts(&[1, 2, 3], 1.959964, 9).unwrap();
        assert!((s.confidence_level() - 0.95).abs() < 1e-5);
    }
}
