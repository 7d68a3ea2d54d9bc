mod rate_limiter;
mod study_source;

pub use rate_limiter::{
    RateLimitAdmin, RateLimitConfig, RateLimited, RateLimiter, RequestRateLimiter,
};
pub use study_source::{ReferenceDataSource, RegistryApi, StudyPage, StudySource};
