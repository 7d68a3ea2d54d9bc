pub mod rest;

pub use rest::{ApiError, AppState, TrustedProxies, create_router};
