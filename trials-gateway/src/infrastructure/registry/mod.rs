//! Upstream access to the trials registry
//!
//! - **client**: `StudySource`/`ReferenceDataSource` implementation
//! - **cache**: TTL cache of decoded responses
//! - **transport**: the HTTP seam (reqwest in production, fakes in tests)
//! - **query**: query-string encoding of searches

mod cache;
mod client;
mod query;
mod transport;

pub use cache::{DEFAULT_CACHE_TTL, FetchGuard, ResponseCache};
pub use client::{DEFAULT_BASE_URL, RegistryClient};
pub use query::search_params;
pub use transport::{HttpTransport, ReqwestTransport, RestError, TransportResponse};
