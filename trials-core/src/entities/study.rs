use serde::{Deserialize, Serialize};

/// Default overall status when the registry omits one
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Flat view of a single registry study
///
/// Produced by [`crate::normalize`]. Absent upstream values stay `None`
/// rather than being replaced with placeholder strings or zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedStudy {
    /// NCT identifier
    pub id: String,
    pub title: String,
    pub status: String,
    pub has_results: bool,
    pub enrollment_count: Option<u64>,
    /// ISO date as published by the registry, possibly `YYYY-MM` or `YYYY`
    pub start_date: Option<String>,
    pub conditions: Vec<String>,
}

/// A study paired with its yearly enrollment rate
///
/// The rate is always serialized; `null` means it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedStudy {
    #[serde(flatten)]
    pub study: NormalizedStudy,
    pub enrollment_rate: Option<f64>,
}

impl NormalizedStudy {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        NormalizedStudy {
            id: id.into(),
            title: title.into(),
            status: UNKNOWN_STATUS.to_string(),
            has_results: false,
            enrollment_count: None,
            start_date: None,
            conditions: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_results(mut self, has_results: bool) -> Self {
        self.has_results = has_results;
        self
    }

    pub fn with_enrollment(mut self, count: u64) -> Self {
        self.enrollment_count = Some(count);
        self
    }

    pub fn with_start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    pub fn with_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    /// Integer prefix of the start date before the first `-`
    pub fn start_year(&self) -> Option<i32> {
        self.start_date
            .as_deref()?
            .split('-')
            .next()?
            .trim()
            .parse()
            .ok()
    }
}
