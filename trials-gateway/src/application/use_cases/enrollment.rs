use std::sync::Arc;

use tracing::info;
use trials_core::{EnrollmentInsights, EnrollmentStats};

use crate::application::GatewayError;
use crate::application::pagination::{PaginationConfig, collect_all};
use crate::application::ports::{RequestRateLimiter, StudySource};
use crate::domain::{DEFAULT_CONDITION, StudySearch};

const INSIGHTS_PAGE_SIZE: u32 = 100;

/// Enrollment summaries over one page or over several aggregated pages
pub struct EnrollmentUseCase<S, R>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    studies: Arc<S>,
    rate_limiter: Arc<R>,
    pagination: PaginationConfig,
}

impl<S, R> EnrollmentUseCase<S, R>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    pub fn new(studies: Arc<S>, rate_limiter: Arc<R>, pagination: PaginationConfig) -> Self {
        Self {
            studies,
            rate_limiter,
            pagination,
        }
    }

    /// Average, total and distribution over one page of default-condition studies
    pub async fn insights(&self, client_id: &str) -> Result<EnrollmentInsights, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;

        let search = StudySearch::for_condition(DEFAULT_CONDITION).with_page_size(INSIGHTS_PAGE_SIZE);
        let page = self.studies.search_studies(&search).await?;
        Ok(EnrollmentInsights::compute(&page.normalized()))
    }

    /// Full statistics over up to `max_pages` pages
    ///
    /// `max_pages` is capped by the configured budget.
    pub async fn stats(
        &self,
        client_id: &str,
        condition: String,
        max_pages: Option<u32>,
    ) -> Result<EnrollmentStats, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;

        let max_pages = max_pages
            .unwrap_or(self.pagination.max_pages)
            .clamp(1, self.pagination.max_pages.max(1));
        let search = StudySearch::for_condition(condition).with_page_size(self.pagination.page_size);

        let aggregated = collect_all(
            self.studies.as_ref(),
            search,
            max_pages,
            self.pagination.empty_page_policy,
        )
        .await?;

        if aggregated.studies.is_empty() {
            return Err(GatewayError::DataShape(
                "No studies found in fetched data".to_string(),
            ));
        }

        let stats = EnrollmentStats::compute(&aggregated.studies)?;
        info!(
            pages = aggregated.pages_fetched,
            studies = stats.total_studies,
            "Computed enrollment statistics"
        );
        Ok(stats)
    }
}
