//! Shared domain types for the clinical trials gateway
//!
//! Everything in this crate is pure: no I/O, no clocks, no shared state.
//!
//! - **entities**: flat records produced from registry payloads
//! - **normalize**: extraction of those records from raw registry JSON
//! - **stats**: enrollment statistics and grouping over normalized records

pub mod entities;
pub mod normalize;
pub mod stats;

// Re-export entities at crate root
pub use entities::{
    BoundingBox, GeoPoint, NormalizedStudy, ParticipantFlow, RatedStudy, SiteLocation,
    UNKNOWN_COUNTRY,
};

// Re-export the normalizer entry points
pub use normalize::{
    last_update_date, next_page_token, normalize, normalize_page, page_studies, participant_flow,
    site_locations,
};

// Re-export stats at crate root
pub use stats::{EnrollmentInsights, EnrollmentStats, HistogramBin, StatsError};
