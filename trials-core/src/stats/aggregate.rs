use indexmap::IndexMap;

use crate::entities::{NormalizedStudy, SiteLocation};

/// Occurrences of each listed condition, in first-seen order
pub fn condition_counts(studies: &[NormalizedStudy]) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for condition in studies.iter().flat_map(|study| &study.conditions) {
        *counts.entry(condition.clone()).or_insert(0) += 1;
    }
    counts
}

/// Number of site locations per country, in first-seen order
pub fn country_counts<'a, I>(locations: I) -> IndexMap<String, usize>
where
    I: IntoIterator<Item = &'a SiteLocation>,
{
    let mut counts = IndexMap::new();
    for location in locations {
        *counts.entry(location.country.clone()).or_insert(0) += 1;
    }
    counts
}

/// Number of dates per four-digit year prefix
///
/// Dates not starting with four ASCII digits are skipped.
pub fn year_counts<'a, I>(dates: I) -> IndexMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = IndexMap::new();
    for year in dates.into_iter().filter_map(year_prefix) {
        *counts.entry(year.to_string()).or_insert(0) += 1;
    }
    counts
}

fn year_prefix(date: &str) -> Option<&str> {
    let year = date.trim_start().get(..4)?;
    year.bytes().all(|b| b.is_ascii_digit()).then_some(year)
}
