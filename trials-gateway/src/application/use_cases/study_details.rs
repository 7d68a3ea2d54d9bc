use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use trials_core::ParticipantFlow;

use crate::application::GatewayError;
use crate::application::ports::{RequestRateLimiter, StudySource};

const FLOW_FIELDS: [&str; 2] = ["protocolSection", "resultsSection"];

/// Outcome of a participant-flow lookup
#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantFlowOutcome {
    Funnel(ParticipantFlow),
    /// Results are posted but carry no participant flow module
    NoParticipantFlow,
    /// The study has no results section at all
    NoResults,
}

/// Single-study lookups by NCT id
pub struct StudyDetailsUseCase<S, R>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    studies: Arc<S>,
    rate_limiter: Arc<R>,
}

impl<S, R> StudyDetailsUseCase<S, R>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    pub fn new(studies: Arc<S>, rate_limiter: Arc<R>) -> Self {
        Self {
            studies,
            rate_limiter,
        }
    }

    /// Raw registry record, `None` when the registry returned an empty body
    pub async fn get(
        &self,
        client_id: &str,
        nct_id: &str,
        fields: &[String],
    ) -> Result<Option<Value>, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;
        validate_nct_id(nct_id)?;

        let study = self.studies.get_study(nct_id, fields).await?;
        Ok((!is_empty(&study)).then_some(study))
    }

    pub async fn participant_flow(
        &self,
        client_id: &str,
        nct_id: &str,
    ) -> Result<ParticipantFlowOutcome, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;
        validate_nct_id(nct_id)?;

        let fields: Vec<String> = FLOW_FIELDS.iter().map(|f| f.to_string()).collect();
        let study = self.studies.get_study(nct_id, &fields).await?;

        let Some(results) = study.get("resultsSection").filter(|r| !is_empty(r)) else {
            debug!(nct_id, "No results section found");
            return Ok(ParticipantFlowOutcome::NoResults);
        };

        Ok(match trials_core::participant_flow(results) {
            Some(flow) => ParticipantFlowOutcome::Funnel(flow),
            None => ParticipantFlowOutcome::NoParticipantFlow,
        })
    }
}

fn validate_nct_id(nct_id: &str) -> Result<(), GatewayError> {
    if nct_id.is_empty() || !nct_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(GatewayError::validation(format!(
            "Invalid NCT id: '{}'",
            nct_id
        )));
    }
    Ok(())
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
