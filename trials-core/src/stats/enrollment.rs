use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{histogram, mean, median, percentiles, sum, HistogramBin, StatsError};
use super::{DEFAULT_BINS, STANDARD_PERCENTILES};
use crate::entities::{NormalizedStudy, RatedStudy};

/// Present enrollment counts, in study order
pub fn enrollment_counts(studies: &[NormalizedStudy]) -> Vec<f64> {
    studies
        .iter()
        .filter_map(|study| study.enrollment_count)
        .map(|count| count as f64)
        .collect()
}

/// Participants enrolled per year since the study started
///
/// A study starting this year (or with a start year in the future) reports
/// its raw count. Missing count, missing start date or an unparsable year
/// give `None`.
pub fn enrollment_rate(study: &NormalizedStudy, current_year: i32) -> Option<f64> {
    let count = study.enrollment_count? as f64;
    let years = current_year - study.start_year()?;
    if years <= 0 {
        Some(count)
    } else {
        Some(count / f64::from(years))
    }
}

/// Pair every study with its enrollment rate
pub fn with_enrollment_rates(studies: Vec<NormalizedStudy>, current_year: i32) -> Vec<RatedStudy> {
    studies
        .into_iter()
        .map(|study| RatedStudy {
            enrollment_rate: enrollment_rate(&study, current_year),
            study,
        })
        .collect()
}

/// Number of studies per distinct enrollment count
pub fn enrollment_distribution(studies: &[NormalizedStudy]) -> BTreeMap<u64, usize> {
    let mut distribution = BTreeMap::new();
    for count in studies.iter().filter_map(|s| s.enrollment_count) {
        *distribution.entry(count).or_insert(0) += 1;
    }
    distribution
}

/// Summary over a multi-page collection of studies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentStats {
    pub total_studies: usize,
    pub average_enrollment: f64,
    pub median_enrollment: f64,
    pub enrollment_percentiles: IndexMap<String, f64>,
    pub enrollment_ranges: Vec<HistogramBin>,
}

impl EnrollmentStats {
    /// Fails with [`StatsError::NoData`] when no study reports an enrollment count
    pub fn compute(studies: &[NormalizedStudy]) -> Result<Self, StatsError> {
        let counts = enrollment_counts(studies);
        Ok(EnrollmentStats {
            total_studies: studies.len(),
            average_enrollment: mean(&counts)?,
            median_enrollment: median(&counts)?,
            enrollment_percentiles: percentiles(&counts, &STANDARD_PERCENTILES)?,
            enrollment_ranges: histogram(&counts, DEFAULT_BINS)?,
        })
    }
}

/// Quick view over a single page of studies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentInsights {
    /// `None` when no study reports an enrollment count
    pub average_enrollment: Option<f64>,
    pub total_enrollment: u64,
    pub enrollment_distribution: BTreeMap<u64, usize>,
}

impl EnrollmentInsights {
    pub fn compute(studies: &[NormalizedStudy]) -> Self {
        let counts = enrollment_counts(studies);
        EnrollmentInsights {
            average_enrollment: mean(&counts).ok(),
            total_enrollment: sum(&counts) as u64,
            enrollment_distribution: enrollment_distribution(studies),
        }
    }
}
