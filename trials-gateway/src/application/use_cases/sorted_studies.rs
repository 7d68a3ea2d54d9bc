use std::sync::Arc;

use crate::application::GatewayError;
use crate::application::ports::{RequestRateLimiter, StudySource};
use crate::domain::{SortKey, StudySearch};

use super::StudyListing;

#[derive(Debug, Clone, Default)]
pub struct SortedStudiesQuery {
    pub sort_by: Vec<String>,
    /// Same length as `sort_by`, or empty for ascending everywhere
    pub sort_order: Vec<String>,
    pub page_size: u32,
    pub page_token: Option<String>,
}

/// Registry search ordered by several fields
pub struct SortedStudiesUseCase<S, R>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    studies: Arc<S>,
    rate_limiter: Arc<R>,
}

impl<S, R> SortedStudiesUseCase<S, R>
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
        query: SortedStudiesQuery,
    ) -> Result<StudyListing, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;

        let sort = SortKey::pair(&query.sort_by, &query.sort_order)
            .map_err(GatewayError::Validation)?;

        let search = StudySearch::default()
            .with_sort(sort)
            .with_page_size(query.page_size)
            .with_page_token(query.page_token);

        let page = self.studies.search_studies(&search).await?;
        Ok(StudyListing {
            studies: page.normalized(),
            next_page_token: page.next_page_token(),
        })
    }
}
