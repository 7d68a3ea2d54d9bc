use std::time::Duration;

use thiserror::Error;
use trials_core::StatsError;

use crate::application::ports::RateLimited;
use crate::domain::FetchError;

/// Error returned by every use case
///
/// Mapped to HTTP only in the presentation layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    /// Non-success answer from the registry, status preserved
    #[error("registry returned HTTP {status}")]
    Upstream { status: u16, body: String },

    #[error("registry request failed: {0}")]
    FetchFailed(String),

    /// Upstream data could not be turned into the requested aggregate
    #[error("unexpected data shape: {0}")]
    DataShape(String),

    #[error("{0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation(message.into())
    }
}

impl From<RateLimited> for GatewayError {
    fn from(err: RateLimited) -> Self {
        GatewayError::RateLimited {
            retry_after: err.retry_after,
        }
    }
}

impl From<FetchError> for GatewayError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Upstream { status, body } => GatewayError::Upstream { status, body },
            FetchError::Network(msg) | FetchError::Decode(msg) => GatewayError::FetchFailed(msg),
        }
    }
}

impl From<StatsError> for GatewayError {
    fn from(err: StatsError) -> Self {
        GatewayError::DataShape(err.to_string())
    }
}
