use async_trait::async_trait;
use serde_json::Value;
use trials_core::NormalizedStudy;

use crate::domain::{FetchError, StudySearch};

/// One page of the registry `/studies` response, kept raw
#[derive(Debug, Clone, PartialEq)]
pub struct StudyPage(pub Value);

impl StudyPage {
    /// Raw study records of this page
    pub fn studies(&self) -> &[Value] {
        trials_core::page_studies(&self.0)
    }

    pub fn next_page_token(&self) -> Option<String> {
        trials_core::next_page_token(&self.0)
    }

    /// Normalized records, dropping those without id or title
    pub fn normalized(&self) -> Vec<NormalizedStudy> {
        trials_core::normalize_page(&self.0)
    }
}

/// Study search and lookup against the registry
///
/// Uses the domain-level `FetchError` so callers stay independent of the
/// HTTP client.
#[async_trait]
pub trait StudySource: Send + Sync {
    async fn search_studies(&self, search: &StudySearch) -> Result<StudyPage, FetchError>;

    /// Raw record of one study; `fields` restricts the returned sections
    async fn get_study(&self, nct_id: &str, fields: &[String]) -> Result<Value, FetchError>;
}

/// Registry metadata endpoints, passed through as returned
#[async_trait]
pub trait ReferenceDataSource: Send + Sync {
    async fn study_enums(&self) -> Result<Value, FetchError>;

    async fn search_areas(&self) -> Result<Value, FetchError>;

    async fn field_values(&self, fields: &[String], types: &[String]) -> Result<Value, FetchError>;

    async fn size_stats(&self) -> Result<Value, FetchError>;
}

/// Everything the gateway reads from the registry
pub trait RegistryApi: StudySource + ReferenceDataSource {}

// Blanket implementation: anything implementing both traits is a RegistryApi
impl<T: StudySource + ReferenceDataSource> RegistryApi for T {}
