use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Participant funnel of a study with posted results
///
/// Totals are summed over every period of the participant flow module.
/// `drop_reasons` keeps the order in which reasons were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantFlow {
    pub total_started: u64,
    pub total_completed: u64,
    pub total_dropped: u64,
    pub drop_reasons: IndexMap<String, u64>,
}

impl ParticipantFlow {
    pub fn record_started(&mut self, count: u64) {
        self.total_started += count;
    }

    pub fn record_completed(&mut self, count: u64) {
        self.total_completed += count;
    }

    pub fn record_dropped(&mut self, reason: &str, count: u64) {
        self.total_dropped += count;
        *self.drop_reasons.entry(reason.to_string()).or_insert(0) += count;
    }

    /// Share of started participants that completed, if anyone started
    pub fn completion_rate(&self) -> Option<f64> {
        if self.total_started == 0 {
            return None;
        }
        Some(self.total_completed as f64 / self.total_started as f64)
    }
}
