use crate::application::GatewayError;
use crate::presentation::rest::dto::ErrorResponse;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tracing::warn;

/// API error type
#[derive(Debug)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub status: StatusCode,
    /// Sent as `Retry-After`, rounded up to whole seconds
    pub retry_after: Option<Duration>,
}

impl ApiError {
    fn new(status: StatusCode, code: i32, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            status,
            retry_after: None,
        }
    }

    pub fn bad_request(code: i32, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        let msg = match retry_after {
            Some(wait) => format!("Too many requests; retry after {}s", retry_after_secs(wait)),
            None => "Too many requests".to_string(),
        };
        ApiError {
            retry_after,
            ..Self::new(StatusCode::TOO_MANY_REQUESTS, -1003, msg)
        }
    }

    /// Upstream status is kept when it is an error status, otherwise 502
    pub fn upstream(status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        Self::new(status, -2000, format!("Registry error: {}", body))
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, -2001, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, -2002, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, -1000, message)
    }

    pub fn missing_parameter(param: &str) -> Self {
        Self::bad_request(
            -1102,
            format!("Mandatory parameter '{}' was not sent", param),
        )
    }

    pub fn invalid_parameter(param: &str, reason: &str) -> Self {
        Self::bad_request(-1100, format!("Illegal parameter '{}': {}", param, reason))
    }
}

fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::RateLimited { retry_after } => {
                warn!(?retry_after, "Request rejected by rate limiter");
                ApiError::rate_limited(retry_after)
            }
            GatewayError::Upstream { status, body } => ApiError::upstream(status, &body),
            GatewayError::FetchFailed(msg) => ApiError::bad_gateway(msg),
            GatewayError::DataShape(msg) => ApiError::unprocessable(msg),
            GatewayError::Validation(msg) => ApiError::bad_request(-1100, msg),
            GatewayError::Internal(msg) => ApiError::internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse::new(self.code, self.message));
        let mut response = (self.status, body).into_response();
        if let Some(wait) = self.retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs(wait)));
        }
        response
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "API Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
