use indexmap::IndexMap;
use serde::Serialize;
use trials_core::{NormalizedStudy, ParticipantFlow, RatedStudy};

use crate::application::{
    CountryBreakdown, EnrichedStudies, StudiesInBounds, StudyListing, YearBreakdown,
};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// One page of studies
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyListResponse {
    pub count: usize,
    pub studies: Vec<NormalizedStudy>,
    pub next_page_token: Option<String>,
}

impl From<StudyListing> for StudyListResponse {
    fn from(listing: StudyListing) -> Self {
        StudyListResponse {
            count: listing.studies.len(),
            studies: listing.studies,
            next_page_token: listing.next_page_token,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudiesInBoundsResponse {
    pub count: usize,
    pub studies: Vec<NormalizedStudy>,
    pub country_counts: IndexMap<String, usize>,
}

impl From<StudiesInBounds> for StudiesInBoundsResponse {
    fn from(result: StudiesInBounds) -> Self {
        StudiesInBoundsResponse {
            count: result.studies.len(),
            studies: result.studies,
            country_counts: result.country_counts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoStatsResponse {
    pub total_studies: usize,
    pub country_counts: IndexMap<String, usize>,
}

impl From<CountryBreakdown> for GeoStatsResponse {
    fn from(breakdown: CountryBreakdown) -> Self {
        GeoStatsResponse {
            total_studies: breakdown.total_studies,
            country_counts: breakdown.country_counts,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStatsResponse {
    pub total_studies: usize,
    pub year_breakdown: IndexMap<String, usize>,
}

impl From<YearBreakdown> for TimeStatsResponse {
    fn from(breakdown: YearBreakdown) -> Self {
        TimeStatsResponse {
            total_studies: breakdown.total_studies,
            year_breakdown: breakdown.year_breakdown,
        }
    }
}

/// Studies with enrollment rates plus condition counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedStudiesResponse {
    pub count: usize,
    pub studies: Vec<RatedStudy>,
    pub condition_counts: IndexMap<String, usize>,
    pub next_page_token: Option<String>,
}

impl From<EnrichedStudies> for EnrichedStudiesResponse {
    fn from(result: EnrichedStudies) -> Self {
        EnrichedStudiesResponse {
            count: result.studies.len(),
            studies: result.studies,
            condition_counts: result.condition_counts,
            next_page_token: result.next_page_token,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelResponse {
    pub funnel: ParticipantFlow,
}

/// Informational body for lookups that found nothing to report
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: i32,
    pub msg: String,
}

impl ErrorResponse {
    pub fn new(code: i32, msg: impl Into<String>) -> Self {
        ErrorResponse {
            code,
            msg: msg.into(),
        }
    }
}
