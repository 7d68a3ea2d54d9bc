use std::sync::Arc;

use indexmap::IndexMap;
use trials_core::stats::year_counts;

use crate::application::GatewayError;
use crate::application::ports::{RequestRateLimiter, StudySource};
use crate::domain::StudySearch;

const TIME_FIELDS: [&str; 2] = [
    "protocolSection.identificationModule.nctId",
    "protocolSection.statusModule.lastUpdatePostDateStruct.date",
];

const TIME_PAGE_SIZE: u32 = 100;

pub const DEFAULT_START_YEAR: i32 = 2020;

#[derive(Debug, Clone, PartialEq)]
pub struct YearBreakdown {
    pub total_studies: usize,
    /// Studies per last-update year
    pub year_breakdown: IndexMap<String, usize>,
}

/// Studies updated since a given year, bucketed by update year
pub struct TimeStatsUseCase<S, R>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    studies: Arc<S>,
    rate_limiter: Arc<R>,
}

impl<S, R> TimeStatsUseCase<S, R>
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
        condition: String,
        start_year: i32,
    ) -> Result<YearBreakdown, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;

        if !(1000..=9999).contains(&start_year) {
            return Err(GatewayError::validation(
                "start_year must be a four digit year",
            ));
        }

        let search = StudySearch::for_condition(condition)
            .with_advanced_filter(format!(
                "AREA[LastUpdatePostDate]RANGE[{}-01-01,MAX]",
                start_year
            ))
            .with_fields(TIME_FIELDS)
            .with_page_size(TIME_PAGE_SIZE);

        let page = self.studies.search_studies(&search).await?;
        let studies = page.studies();

        Ok(YearBreakdown {
            total_studies: studies.len(),
            year_breakdown: year_counts(studies.iter().filter_map(trials_core::last_update_date)),
        })
    }
}
