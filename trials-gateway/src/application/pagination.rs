//! Multi-page aggregation over the registry search
//!
//! Follows `nextPageToken` until the registry runs out of pages, the page
//! budget is spent or the empty-page rule fires. Each call owns its
//! accumulator; nothing is shared between requests.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use trials_core::NormalizedStudy;

use crate::application::ports::StudySource;
use crate::domain::{FetchError, StudySearch};

/// What to do with a page that yields no usable records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPagePolicy {
    /// Stop only when the raw page has no studies; pages whose records were
    /// all dropped by normalization are skipped
    #[default]
    Continue,
    /// Stop as soon as a page normalizes to nothing
    Stop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Upper bound on pages fetched per aggregation
    pub max_pages: u32,
    pub page_size: u32,
    pub empty_page_policy: EmptyPagePolicy,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            max_pages: 10,
            page_size: 100,
            empty_page_policy: EmptyPagePolicy::Continue,
        }
    }
}

/// Result of one aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedStudies {
    pub studies: Vec<NormalizedStudy>,
    pub pages_fetched: u32,
    /// Token of the last page fetched, `None` once the registry is exhausted
    pub next_page_token: Option<String>,
}

/// Fetch up to `max_pages` pages sequentially and concatenate their records
///
/// Upstream errors abort the aggregation; partial results are discarded.
pub async fn collect_all<S>(
    source: &S,
    mut search: StudySearch,
    max_pages: u32,
    policy: EmptyPagePolicy,
) -> Result<AggregatedStudies, FetchError>
where
    S: StudySource + ?Sized,
{
    let mut studies = Vec::new();
    let mut pages_fetched = 0;
    let mut next_page_token = search.page_token.clone();

    while pages_fetched < max_pages {
        search.page_token = next_page_token.take();
        let page = source.search_studies(&search).await?;
        pages_fetched += 1;
        next_page_token = page.next_page_token();

        if page.studies().is_empty() {
            debug!(page = pages_fetched, "Registry returned an empty page");
            break;
        }

        let normalized = page.normalized();
        if normalized.is_empty() && policy == EmptyPagePolicy::Stop {
            debug!(page = pages_fetched, "No usable records on page, stopping");
            break;
        }
        studies.extend(normalized);

        if next_page_token.is_none() {
            break;
        }
    }

    info!(
        condition = %search.condition,
        pages = pages_fetched,
        studies = studies.len(),
        exhausted = next_page_token.is_none(),
        "Aggregated registry pages"
    );

    Ok(AggregatedStudies {
        studies,
        pages_fetched,
        next_page_token,
    })
}
