use std::sync::Arc;

use indexmap::IndexMap;
use trials_core::RatedStudy;
use trials_core::stats::{condition_counts, with_enrollment_rates};

use crate::application::GatewayError;
use crate::application::ports::{RequestRateLimiter, StudySource};
use crate::domain::{Clock, DEFAULT_CONDITION, StudySearch};

#[derive(Debug, Clone, Default)]
pub struct EnrichedStudiesQuery {
    /// Combined with `AND`; empty means the default condition
    pub conditions: Vec<String>,
    pub page_size: u32,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedStudies {
    pub studies: Vec<RatedStudy>,
    pub condition_counts: IndexMap<String, usize>,
    pub next_page_token: Option<String>,
}

/// Multi-condition search with enrollment rates and condition counts
pub struct EnrichedStudiesUseCase<S, R, C>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
    C: Clock + ?Sized,
{
    studies: Arc<S>,
    rate_limiter: Arc<R>,
    clock: Arc<C>,
}

impl<S, R, C> EnrichedStudiesUseCase<S, R, C>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(studies: Arc<S>, rate_limiter: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            studies,
            rate_limiter,
            clock,
        }
    }

    pub async fn execute(
        &self,
        client_id: &str,
        query: EnrichedStudiesQuery,
    ) -> Result<EnrichedStudies, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;

        let condition = if query.conditions.is_empty() {
            DEFAULT_CONDITION.to_string()
        } else {
            query.conditions.join(" AND ")
        };
        let search = StudySearch::for_condition(condition)
            .with_page_size(query.page_size)
            .with_page_token(query.page_token);

        let page = self.studies.search_studies(&search).await?;
        let normalized = page.normalized();
        let condition_counts = condition_counts(&normalized);
        let studies = with_enrollment_rates(normalized, self.clock.current_year());

        Ok(EnrichedStudies {
            studies,
            condition_counts,
            next_page_token: page.next_page_token(),
        })
    }
}
