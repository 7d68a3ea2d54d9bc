use serde::{Deserialize, Serialize};

use super::StatsError;

/// Number of bins used for enrollment ranges
pub const DEFAULT_BINS: usize = 10;

/// One equal-width bin, covering `(lower, upper]`
///
/// The first bin of a histogram also includes its lower edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram between the minimum and maximum value
///
/// A value sitting exactly on an edge belongs to the lower bin. A degenerate
/// range (all values equal) is widened by 0.1% on each side, or by 0.001
/// when the value is zero.
pub fn histogram(values: &[f64], bins: usize) -> Result<Vec<HistogramBin>, StatsError> {
    if values.is_empty() || bins == 0 {
        return Err(StatsError::NoData);
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if lo == hi {
        let pad = if lo == 0.0 { 0.001 } else { lo.abs() * 0.001 };
        lo -= pad;
        hi += pad;
    }

    let width = (hi - lo) / bins as f64;
    let uppers: Vec<f64> = (1..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; bins];
    for &value in values {
        let index = uppers.partition_point(|&upper| upper < value).min(bins - 1);
        counts[index] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: if i == 0 { lo } else { uppers[i - 1] },
            upper: uppers[i],
            count,
        })
        .collect())
}
