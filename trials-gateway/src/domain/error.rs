use thiserror::Error;

/// Failure talking to the trials registry
///
/// Domain-level error: infrastructure adapters convert their transport
/// errors into this type so callers never see reqwest details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The registry answered with a non-success status
    #[error("registry returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    /// Connection failure or timeout
    #[error("network error: {0}")]
    Network(String),
    /// The response body was not the expected JSON
    #[error("failed to decode registry response: {0}")]
    Decode(String),
}
