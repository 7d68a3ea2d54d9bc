use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use super::cache::ResponseCache;
use super::query::{QueryParams, field_value_params, search_params, study_params};
use super::transport::HttpTransport;
use crate::application::ports::{ReferenceDataSource, StudyPage, StudySource};
use crate::domain::{Clock, FetchError, StudySearch};

pub const DEFAULT_BASE_URL: &str = "https://clinicaltrials.gov/api/v2";

/// Client for the ClinicalTrials.gov v2 API
///
/// Every request carries `format=json` and goes through the response cache.
/// The request URL, with its parameters sorted by name, is the cache key.
pub struct RegistryClient<T: HttpTransport, C: Clock> {
    transport: T,
    base_url: Url,
    cache: Arc<ResponseCache<C>>,
}

impl<T: HttpTransport, C: Clock> RegistryClient<T, C> {
    pub fn new(
        base_url: &str,
        transport: T,
        cache: Arc<ResponseCache<C>>,
    ) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(RegistryClient {
            transport,
            base_url,
            cache,
        })
    }

    pub fn cache(&self) -> &ResponseCache<C> {
        &self.cache
    }

    /// Canonical request URL: base path + segments, parameters sorted by name
    fn request_url(&self, segments: &[&str], mut params: QueryParams) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Network(format!("invalid registry base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        params.push(("format", "json".to_string()));
        params.sort();
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(name, value)| (*name, value.as_str())));
        Ok(url)
    }

    async fn fetch_json(&self, segments: &[&str], params: QueryParams) -> Result<Value, FetchError> {
        let url = self.request_url(segments, params)?;

        if let Some(body) = self.cache.get(url.as_str()) {
            info!(url = %url, "Registry cache hit");
            return Ok(body);
        }

        let _fetch = self.cache.lock_signature(url.as_str()).await;
        if let Some(body) = self.cache.get(url.as_str()) {
            info!(url = %url, "Registry cache hit after concurrent fetch");
            return Ok(body);
        }

        debug!(url = %url, "Requesting registry");
        let response = self.transport.get(&url).await.inspect_err(|e| {
            error!(url = %url, error = %e, "Registry request failed");
        })?;

        if !response.is_success() {
            error!(url = %url, status = response.status, "Registry returned an error status");
            return Err(FetchError::Upstream {
                status: response.status,
                body: response.body,
            });
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            error!(url = %url, error = %e, "Undecodable registry response");
            FetchError::Decode(e.to_string())
        })?;

        self.cache.insert(url.as_str(), body.clone());
        Ok(body)
    }
}

#[async_trait]
impl<T: HttpTransport, C: Clock> StudySource for RegistryClient<T, C> {
    async fn search_studies(&self, search: &StudySearch) -> Result<StudyPage, FetchError> {
        self.fetch_json(&["studies"], search_params(search))
            .await
            .map(StudyPage)
    }

    async fn get_study(&self, nct_id: &str, fields: &[String]) -> Result<Value, FetchError> {
        self.fetch_json(&["studies", nct_id], study_params(fields))
            .await
    }
}

#[async_trait]
impl<T: HttpTransport, C: Clock> ReferenceDataSource for RegistryClient<T, C> {
    async fn study_enums(&self) -> Result<Value, FetchError> {
        self.fetch_json(&["studies", "enums"], Vec::new()).await
    }

    async fn search_areas(&self) -> Result<Value, FetchError> {
        self.fetch_json(&["studies", "search-areas"], Vec::new())
            .await
    }

    async fn field_values(&self, fields: &[String], types: &[String]) -> Result<Value, FetchError> {
        self.fetch_json(&["stats", "field", "values"], field_value_params(fields, types))
            .await
    }

    async fn size_stats(&self) -> Result<Value, FetchError> {
        self.fetch_json(&["stats", "size"], Vec::new()).await
    }
}
