//! Enrollment statistics and grouping
//!
//! All functions are pure and operate on `f64` slices or on normalized studies.
//! Order statistics sort a local copy with `f64::total_cmp`, so callers never
//! need to pre-sort.
//!
//! # Conventions
//!
//! - Percentiles interpolate linearly at rank `p * (n - 1)`
//! - Histogram bins are closed on the right, see [`histogram`]
//! - Grouping helpers keep keys in first-seen order

mod aggregate;
mod enrollment;
mod histogram;

pub use aggregate::{condition_counts, country_counts, year_counts};
pub use enrollment::{
    enrollment_counts, enrollment_distribution, enrollment_rate, with_enrollment_rates,
    EnrollmentInsights, EnrollmentStats,
};
pub use histogram::{histogram, HistogramBin, DEFAULT_BINS};

use indexmap::IndexMap;
use thiserror::Error;

/// Percentiles reported by the enrollment statistics
pub const STANDARD_PERCENTILES: [f64; 7] = [0.05, 0.1, 0.25, 0.5, 0.75, 0.9, 0.95];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("no values to aggregate")]
    NoData,
}

/// Calculate sum
#[inline]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Calculate mean
pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::NoData);
    }
    Ok(sum(values) / values.len() as f64)
}

/// Calculate median (mean of the two middle values for even lengths)
pub fn median(values: &[f64]) -> Result<f64, StatsError> {
    percentile(values, 0.5)
}

/// Linearly interpolated percentile, `p` in `[0, 1]`
pub fn percentile(values: &[f64], p: f64) -> Result<f64, StatsError> {
    let sorted = sorted(values)?;
    Ok(interpolate(&sorted, p))
}

/// Several percentiles at once, keyed by their decimal form (`"0.05"`, `"0.5"`, ...)
pub fn percentiles(values: &[f64], ps: &[f64]) -> Result<IndexMap<String, f64>, StatsError> {
    let sorted = sorted(values)?;
    Ok(ps
        .iter()
        .map(|&p| (p.to_string(), interpolate(&sorted, p)))
        .collect())
}

fn sorted(values: &[f64]) -> Result<Vec<f64>, StatsError> {
    if values.is_empty() {
        return Err(StatsError::NoData);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

fn interpolate(sorted: &[f64], p: f64) -> f64 {
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
