use std::sync::Arc;

use serde_json::Value;

use crate::application::GatewayError;
use crate::application::ports::{ReferenceDataSource, RequestRateLimiter};

/// Registry metadata passthroughs
pub struct ReferenceDataUseCase<S, R>
where
    S: ReferenceDataSource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    source: Arc<S>,
    rate_limiter: Arc<R>,
}

impl<S, R> ReferenceDataUseCase<S, R>
where
    S: ReferenceDataSource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    pub fn new(source: Arc<S>, rate_limiter: Arc<R>) -> Self {
        Self {
            source,
            rate_limiter,
        }
    }

    pub async fn enums(&self, client_id: &str) -> Result<Value, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;
        Ok(self.source.study_enums().await?)
    }

    pub async fn search_areas(&self, client_id: &str) -> Result<Value, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;
        Ok(self.source.search_areas().await?)
    }

    pub async fn size_stats(&self, client_id: &str) -> Result<Value, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;
        Ok(self.source.size_stats().await?)
    }

    /// Value statistics for `fields`, optionally restricted to field `types`
    pub async fn field_values(
        &self,
        client_id: &str,
        fields: &[String],
        types: &[String],
    ) -> Result<Value, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;
        if fields.is_empty() {
            return Err(GatewayError::validation(
                "Mandatory parameter 'fields' was not sent",
            ));
        }
        Ok(self.source.field_values(fields, types).await?)
    }
}
