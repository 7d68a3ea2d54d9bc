use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::domain::FetchError;

/// Status and body of an upstream response, before any decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw HTTP GET against the registry
///
/// Only transport failures are errors here; non-2xx answers come back as
/// responses so the caller decides what to do with them.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<TransportResponse, FetchError>;
}

#[derive(Error, Debug)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convert infrastructure RestError to domain FetchError
impl From<RestError> for FetchError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Http(e) if e.is_timeout() => {
                FetchError::Network(format!("request timed out: {}", e))
            }
            RestError::Http(e) => FetchError::Network(e.to_string()),
        }
    }
}

/// reqwest-backed transport with a whole-request timeout
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, RestError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("trials-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ReqwestTransport { client })
    }

    async fn send(&self, url: &Url) -> Result<TransportResponse, RestError> {
        let resp = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, FetchError> {
        self.send(url).await.map_err(FetchError::from)
    }
}
