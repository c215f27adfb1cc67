//! Statistics Calculator Module
//! Descriptive statistics for the primary metric of each location.

use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Statistics for a single location, rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub location: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self {
            location: String::new(),
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Round to two decimal places. NaN stays NaN.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    ///
    /// The standard deviation is the sample one (n - 1) and is NaN for
    /// fewer than two values.
    pub fn compute_descriptive_stats(values: &[f64]) -> GroupStats {
        let n = values.len();
        if n == 0 {
            return GroupStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        GroupStats {
            location: String::new(),
            count: n,
            mean: round2(values.iter().mean()),
            median: round2(median),
            std: round2(values.iter().std_dev()),
            min: round2(sorted[0]),
            max: round2(sorted[n - 1]),
        }
    }

    /// Compute statistics for every location in parallel, keeping input order.
    pub fn compute_location_stats(groups: &[(String, Vec<f64>)]) -> Vec<GroupStats> {
        groups
            .par_iter()
            .map(|(location, values)| {
                let mut stats = Self::compute_descriptive_stats(values);
                stats.location = location.clone();
                stats
            })
            .collect()
    }
}
