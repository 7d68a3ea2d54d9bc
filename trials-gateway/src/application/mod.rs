pub mod error;
pub mod pagination;
pub mod ports;
pub mod use_cases;

pub use error::GatewayError;
pub use pagination::{AggregatedStudies, EmptyPagePolicy, PaginationConfig, collect_all};
pub use ports::{
    RateLimitAdmin, RateLimitConfig, RateLimited, RateLimiter, ReferenceDataSource, RegistryApi,
    RequestRateLimiter, StudyPage, StudySource,
};
pub use use_cases::*;
