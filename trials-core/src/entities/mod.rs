mod location;
mod participant_flow;
mod study;

pub use location::{BoundingBox, GeoPoint, SiteLocation, UNKNOWN_COUNTRY};
pub use participant_flow::ParticipantFlow;
pub use study::{NormalizedStudy, RatedStudy, UNKNOWN_STATUS};
