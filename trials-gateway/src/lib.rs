//! Clinical Trials Gateway
//!
//! A read-only aggregation gateway in front of the ClinicalTrials.gov v2 API.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture with clear separation of concerns:
//!
//! - **Domain**: Clock, registry search types, fetch error
//! - **Application**: Use cases, port interfaces and the pagination aggregator
//! - **Infrastructure**: Token-bucket limiter, registry client with response cache, clocks, config
//! - **Presentation**: REST handlers and API error mapping
//!
//! # Features
//!
//! - Per-client token-bucket rate limiting
//! - TTL cache in front of every upstream call
//! - Flattening of nested registry records (see `trials-core`)
//! - Multi-page aggregation with enrollment statistics
//! - Geographic, time and condition breakdowns
//!
//! # Example
//!
//! ```ignore
//! use trials_gateway::{Gateway, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let gateway = Gateway::new(GatewayConfig::default()).unwrap();
//!     gateway.run().await.unwrap();
//! }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types
pub use domain::{
    Clock, ControllableClock, FetchError, GeoFilter, SortKey, SortOrder, StudySearch, Timestamp,
};

pub use infrastructure::{
    ConfigError, GatewayConfig, RegistryClient, ReqwestTransport, ResponseCache, SimulationClock,
    SystemClock, TokenBucketRateLimiter,
};

pub use application::{
    EmptyPagePolicy, GatewayError, PaginationConfig, RateLimitConfig, StudyPage, collect_all,
};

// Re-export port traits for integration tests
pub use application::ports::{
    RateLimitAdmin, ReferenceDataSource, RegistryApi, RequestRateLimiter, StudySource,
};

pub use presentation::{AppState, TrustedProxies, create_router};

use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Outcome of one maintenance sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub evicted_clients: usize,
    pub purged_responses: usize,
}

/// The gateway server
pub struct Gateway<C: Clock + 'static> {
    pub config: GatewayConfig,
    pub clock: Arc<C>,
    pub rate_limiter: Arc<TokenBucketRateLimiter<C>>,
    pub registry: Arc<dyn RegistryApi>,
    /// Present when the registry is the built-in HTTP client
    cache: Option<Arc<ResponseCache<C>>>,
}

impl<C: Clock + 'static> Gateway<C> {
    /// Create a gateway talking to the configured registry over HTTP
    pub fn with_clock(config: GatewayConfig, clock: Arc<C>) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config.upstream.timeout())
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        let cache = Arc::new(ResponseCache::new(
            config.upstream.cache_ttl(),
            Arc::clone(&clock),
        ));
        let client = RegistryClient::new(&config.upstream.base_url, transport, Arc::clone(&cache))
            .map_err(|e| ConfigError::InvalidBaseUrl {
                url: config.upstream.base_url.clone(),
                reason: e.to_string(),
            })?;

        let mut gateway = Self::with_registry(config, clock, Arc::new(client));
        gateway.cache = Some(cache);
        Ok(gateway)
    }

    /// Create a gateway over any registry implementation
    pub fn with_registry(config: GatewayConfig, clock: Arc<C>, registry: Arc<dyn RegistryApi>) -> Self {
        let rate_limiter = Arc::new(TokenBucketRateLimiter::new(
            config.rate_limits.clone(),
            Arc::clone(&clock),
        ));

        Gateway {
            config,
            clock,
            rate_limiter,
            registry,
            cache: None,
        }
    }

    /// Create the REST API router
    pub fn rest_router(&self) -> Router {
        let state = AppState::new(
            Arc::clone(&self.clock),
            Arc::clone(&self.rate_limiter),
            Arc::clone(&self.registry),
            self.config.pagination.clone(),
        )
        .with_trusted_proxies(TrustedProxies::new(
            self.config.server.trusted_proxies.iter().copied(),
        ));

        create_router(Arc::new(state))
    }

    /// Drop idle rate-limit buckets and stale cached responses
    pub fn sweep(&self) -> SweepStats {
        sweep(&self.rate_limiter, self.cache.as_deref())
    }

    /// Run [`Gateway::sweep`] on the configured interval until the task is aborted
    pub fn spawn_maintenance(&self) -> JoinHandle<()> {
        let rate_limiter = Arc::clone(&self.rate_limiter);
        let cache = self.cache.clone();
        let period = self.config.maintenance.sweep_interval();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                sweep(&rate_limiter, cache.as_deref());
            }
        })
    }

    /// Run the gateway server until Ctrl-C
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.config.server.bind_address();
        let maintenance = self.spawn_maintenance();
        let router = self.rest_router();

        info!("Trials gateway listening on {}", addr);

        let listener = TcpListener::bind(&addr).await?;
        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        maintenance.abort();
        result
    }
}

impl Gateway<SystemClock> {
    /// Create a gateway on the wall clock
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }
}

fn sweep<C: Clock>(
    rate_limiter: &TokenBucketRateLimiter<C>,
    cache: Option<&ResponseCache<C>>,
) -> SweepStats {
    let stats = SweepStats {
        evicted_clients: rate_limiter.evict_idle(),
        purged_responses: cache.map_or(0, ResponseCache::purge_expired),
    };
    debug!(
        evicted_clients = stats.evicted_clients,
        purged_responses = stats.purged_responses,
        tracked_clients = rate_limiter.tracked_clients(),
        "Maintenance sweep"
    );
    stats
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
