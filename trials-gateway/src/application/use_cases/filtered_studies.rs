use std::sync::Arc;

use tracing::debug;
use trials_core::NormalizedStudy;

use crate::application::GatewayError;
use crate::application::ports::{RequestRateLimiter, StudySource};
use crate::domain::StudySearch;

#[derive(Debug, Clone, Default)]
pub struct FilteredStudiesQuery {
    pub search: StudySearch,
    /// Keep only studies with posted results
    pub only_with_results: bool,
}

/// One page of normalized studies plus the token for the next one
#[derive(Debug, Clone, PartialEq)]
pub struct StudyListing {
    pub studies: Vec<NormalizedStudy>,
    pub next_page_token: Option<String>,
}

pub struct FilteredStudiesUseCase<S, R>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    studies: Arc<S>,
    rate_limiter: Arc<R>,
}

impl<S, R> FilteredStudiesUseCase<S, R>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    pub fn new(studies: Arc<S>, rate_limiter: Arc<R>) -> Self {
        Self {
            studies,
            rate_limiter,
        }
    }

    pub async fn execute(
        &self,
        client_id: &str,
        query: FilteredStudiesQuery,
    ) -> Result<StudyListing, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;

        let page = self.studies.search_studies(&query.search).await?;
        let mut studies = page.normalized();
        if query.only_with_results {
            studies.retain(|study| study.has_results);
        }

        debug!(
            condition = %query.search.condition,
            returned = studies.len(),
            "Filtered studies"
        );

        Ok(StudyListing {
            studies,
            next_page_token: page.next_page_token(),
        })
    }
}
