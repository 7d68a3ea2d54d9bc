pub mod clock;
pub mod error;
pub mod search;

pub use clock::{Clock, ControllableClock, Timestamp};
pub use error::FetchError;
pub use search::{
    DEFAULT_CONDITION, DEFAULT_PAGE_SIZE, GeoFilter, MAX_PAGE_SIZE, SortKey, SortOrder,
    StudySearch, clamp_page_size,
};
