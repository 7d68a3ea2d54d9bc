pub mod clock;
pub mod config;
pub mod rate_limiter;
pub mod registry;

pub use clock::{SimulationClock, SystemClock};
pub use config::{ConfigError, GatewayConfig, MaintenanceConfig, ServerConfig, UpstreamConfig};
pub use rate_limiter::TokenBucketRateLimiter;
pub use registry::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_TTL, HttpTransport, RegistryClient, ReqwestTransport,
    ResponseCache, RestError, TransportResponse,
};
