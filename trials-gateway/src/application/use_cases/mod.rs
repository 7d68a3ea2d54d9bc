mod enriched_studies;
mod enrollment;
mod filtered_studies;
mod geo_stats;
mod reference_data;
mod sorted_studies;
mod study_details;
mod time_stats;

pub use enriched_studies::{EnrichedStudies, EnrichedStudiesQuery, EnrichedStudiesUseCase};
pub use enrollment::EnrollmentUseCase;
pub use filtered_studies::{FilteredStudiesQuery, FilteredStudiesUseCase, StudyListing};
pub use geo_stats::{
    CountryBreakdown, DEFAULT_GEO_PAGE_SIZE, DEFAULT_RADIUS, GeoBoundsQuery, GeoStatsQuery,
    GeoStatsUseCase, StudiesInBounds,
};
pub use reference_data::ReferenceDataUseCase;
pub use sorted_studies::{SortedStudiesQuery, SortedStudiesUseCase};
pub use study_details::{ParticipantFlowOutcome, StudyDetailsUseCase};
pub use time_stats::{DEFAULT_START_YEAR, TimeStatsUseCase, YearBreakdown};
