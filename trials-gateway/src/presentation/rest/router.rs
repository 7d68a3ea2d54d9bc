use axum::{
    Json, Router,
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use super::dto::ErrorResponse;
use super::handlers;
use super::params::TrustedProxies;
use crate::application::{PaginationConfig, RegistryApi};
use crate::domain::Clock;
use crate::infrastructure::TokenBucketRateLimiter;

/// Application state shared across handlers
pub struct AppState<C: Clock> {
    pub clock: Arc<C>,
    pub rate_limiter: Arc<TokenBucketRateLimiter<C>>,
    pub registry: Arc<dyn RegistryApi>,
    pub pagination: PaginationConfig,
    pub trusted_proxies: TrustedProxies,
}

impl<C: Clock> AppState<C> {
    pub fn new(
        clock: Arc<C>,
        rate_limiter: Arc<TokenBucketRateLimiter<C>>,
        registry: Arc<dyn RegistryApi>,
        pagination: PaginationConfig,
    ) -> Self {
        AppState {
            clock,
            rate_limiter,
            registry,
            pagination,
            trusted_proxies: TrustedProxies::default(),
        }
    }

    /// Key clients behind these proxies by `X-Forwarded-For`
    pub fn with_trusted_proxies(mut self, trusted_proxies: TrustedProxies) -> Self {
        self.trusted_proxies = trusted_proxies;
        self
    }
}

impl<C: Clock> FromRef<Arc<AppState<C>>> for TrustedProxies {
    fn from_ref(state: &Arc<AppState<C>>) -> Self {
        state.trusted_proxies.clone()
    }
}

/// Create the REST API router
pub fn create_router<C: Clock + 'static>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Study listings
        .route("/api/filtered-studies", get(handlers::filtered_studies::<C>))
        .route(
            "/api/filtered-studies/geo-bounds",
            get(handlers::geo_bounds::<C>),
        )
        .route(
            "/api/sorted-studies/multiple-fields",
            get(handlers::sorted_studies::<C>),
        )
        .route(
            "/api/enriched-studies/multi-conditions",
            get(handlers::enriched_studies::<C>),
        )
        // Single study
        .route("/api/studies/{nct_id}", get(handlers::study::<C>))
        .route(
            "/api/study-results/participant-flow/{nct_id}",
            get(handlers::participant_flow::<C>),
        )
        // Reference data
        .route("/api/enums", get(handlers::enums::<C>))
        .route("/api/search-areas", get(handlers::search_areas::<C>))
        .route("/api/stats/size", get(handlers::size_stats::<C>))
        .route("/api/stats/field/values", get(handlers::field_values::<C>))
        // Statistics
        .route("/api/geo-stats", get(handlers::geo_stats::<C>))
        .route("/api/time-stats", get(handlers::time_stats::<C>))
        .route(
            "/api/enrollment-insights",
            get(handlers::enrollment_insights::<C>),
        )
        .route("/api/enrollment-stats", get(handlers::enrollment_stats::<C>))
        // Middleware
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(-1000, "Internal server error")),
    )
        .into_response()
}
