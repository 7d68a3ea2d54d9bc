mod dto;
mod error;
mod handlers;
mod params;
mod router;

pub use dto::*;
pub use error::ApiError;
pub use params::{ClientId, QueryParams, TrustedProxies};
pub use router::{AppState, create_router};
