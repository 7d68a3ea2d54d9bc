//! Flattening of raw registry payloads
//!
//! Registry records are deeply nested and any section may be missing. Each
//! field is looked up through an explicit JSON pointer and comes back as an
//! `Option`; defaults are applied in one place ([`normalize`]). Records without
//! an NCT id or a brief title are dropped silently.

mod participant_flow;

pub use participant_flow::participant_flow;

use serde_json::Value;
use tracing::debug;

use crate::entities::{GeoPoint, NormalizedStudy, SiteLocation, UNKNOWN_COUNTRY, UNKNOWN_STATUS};

const NCT_ID: &str = "/protocolSection/identificationModule/nctId";
const BRIEF_TITLE: &str = "/protocolSection/identificationModule/briefTitle";
const OVERALL_STATUS: &str = "/protocolSection/statusModule/overallStatus";
const START_DATE: &str = "/protocolSection/statusModule/startDateStruct/date";
const LAST_UPDATE_DATE: &str = "/protocolSection/statusModule/lastUpdatePostDateStruct/date";
const ENROLLMENT_COUNT: &str = "/protocolSection/designModule/enrollmentInfo/count";
const CONDITIONS: &str = "/protocolSection/conditionsModule/conditions";
const LOCATIONS: &str = "/protocolSection/contactsLocationsModule/locations";

fn text_at<'a>(raw: &'a Value, pointer: &str) -> Option<&'a str> {
    raw.pointer(pointer).and_then(Value::as_str)
}

fn array_at<'a>(raw: &'a Value, pointer: &str) -> &'a [Value] {
    raw.pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Flatten one raw study, or `None` if it lacks an id or a title
pub fn normalize(raw: &Value) -> Option<NormalizedStudy> {
    let id = text_at(raw, NCT_ID);
    let title = text_at(raw, BRIEF_TITLE);

    let (Some(id), Some(title)) = (id, title) else {
        debug!(nct_id = ?id, has_title = title.is_some(), "Skipping study without id or title");
        return None;
    };

    Some(NormalizedStudy {
        id: id.to_string(),
        title: title.to_string(),
        status: text_at(raw, OVERALL_STATUS)
            .unwrap_or(UNKNOWN_STATUS)
            .to_string(),
        has_results: raw
            .get("hasResults")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        enrollment_count: raw.pointer(ENROLLMENT_COUNT).and_then(Value::as_u64),
        start_date: text_at(raw, START_DATE).map(str::to_string),
        conditions: array_at(raw, CONDITIONS)
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    })
}

/// The `studies` array of a search response page
pub fn page_studies(page: &Value) -> &[Value] {
    page.get("studies")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Continuation token of a search response page; empty tokens count as absent
pub fn next_page_token(page: &Value) -> Option<String> {
    page.get("nextPageToken")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Normalize every study of a search page, keeping input order
pub fn normalize_page(page: &Value) -> Vec<NormalizedStudy> {
    let studies = page_studies(page);
    let normalized: Vec<NormalizedStudy> = studies.iter().filter_map(normalize).collect();

    debug!(
        received = studies.len(),
        kept = normalized.len(),
        "Normalized study page"
    );
    normalized
}

/// Site locations of a raw study; a missing country becomes [`UNKNOWN_COUNTRY`]
pub fn site_locations(raw: &Value) -> Vec<SiteLocation> {
    array_at(raw, LOCATIONS)
        .iter()
        .map(|location| SiteLocation {
            facility: location
                .get("facility")
                .and_then(Value::as_str)
                .map(str::to_string),
            city: location.get("city").and_then(Value::as_str).map(str::to_string),
            country: location
                .get("country")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_COUNTRY)
                .to_string(),
            geo_point: location.get("geoPoint").and_then(|point| {
                Some(GeoPoint::new(
                    point.get("lat")?.as_f64()?,
                    point.get("lon")?.as_f64()?,
                ))
            }),
        })
        .collect()
}

/// Last update post date of a raw study
pub fn last_update_date(raw: &Value) -> Option<&str> {
    text_at(raw, LAST_UPDATE_DATE).filter(|date| !date.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_study(nct_id: Option<&str>, title: Option<&str>) -> Value {
        let mut identification = serde_json::Map::new();
        if let Some(id) = nct_id {
            identification.insert("nctId".into(), json!(id));
        }
        if let Some(title) = title {
            identification.insert("briefTitle".into(), json!(title));
        }
        json!({
            "hasResults": true,
            "protocolSection": {
                "identificationModule": identification,
                "statusModule": {
                    "overallStatus": "RECRUITING",
                    "startDateStruct": { "date": "2021-03" }
                },
                "designModule": { "enrollmentInfo": { "count": 120 } },
                "conditionsModule": { "conditions": ["Diabetes", "Obesity", "Hypertension"] }
            }
        })
    }

    #[test]
    fn test_normalize_full_record() {
        let study = normalize(&raw_study(Some("NCT01234567"), Some("Metformin trial"))).unwrap();

        assert_eq!(study.id, "NCT01234567");
        assert_eq!(study.title, "Metformin trial");
        assert_eq!(study.status, "RECRUITING");
        assert!(study.has_results);
        assert_eq!(study.enrollment_count, Some(120));
        assert_eq!(study.start_date.as_deref(), Some("2021-03"));
        assert_eq!(study.conditions, vec!["Diabetes", "Obesity", "Hypertension"]);
    }

    #[test]
    fn test_missing_id_or_title_is_dropped() {
        assert!(normalize(&raw_study(None, Some("Title"))).is_none());
        assert!(normalize(&raw_study(Some("NCT1"), None)).is_none());
        assert!(normalize(&raw_study(None, None)).is_none());
        assert!(normalize(&json!({})).is_none());
    }

    #[test]
    fn test_literal_placeholder_values_are_kept() {
        // Only absence drops a record, not a value that happens to look like a default
        let study = normalize(&raw_study(Some("N/A"), Some("No Title"))).unwrap();
        assert_eq!(study.id, "N/A");
        assert_eq!(study.title, "No Title");
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let raw = json!({
            "protocolSection": {
                "identificationModule": { "nctId": "NCT1", "briefTitle": "Bare" }
            }
        });
        let study = normalize(&raw).unwrap();

        assert_eq!(study.status, "Unknown");
        assert!(!study.has_results);
        assert_eq!(study.enrollment_count, None);
        assert_eq!(study.start_date, None);
        assert!(study.conditions.is_empty());
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let raw = json!({
            "hasResults": "yes",
            "protocolSection": {
                "identificationModule": { "nctId": "NCT1", "briefTitle": "Odd" },
                "designModule": { "enrollmentInfo": { "count": "many" } },
                "conditionsModule": { "conditions": ["Asthma", 42, null, "COPD"] }
            }
        });
        let study = normalize(&raw).unwrap();

        assert!(!study.has_results);
        assert_eq!(study.enrollment_count, None);
        assert_eq!(study.conditions, vec!["Asthma", "COPD"]);
    }

    #[test]
    fn test_normalize_page_is_stable_filter() {
        let page = json!({
            "studies": [
                raw_study(Some("NCT1"), Some("First")),
                raw_study(None, Some("Dropped")),
                raw_study(Some("NCT3"), Some("Third")),
                raw_study(Some("NCT4"), None),
                raw_study(Some("NCT5"), Some("Fifth")),
            ],
            "nextPageToken": "abc"
        });
        let ids: Vec<String> = normalize_page(&page).into_iter().map(|s| s.id).collect();

        assert_eq!(ids, vec!["NCT1", "NCT3", "NCT5"]);
        assert_eq!(next_page_token(&page).as_deref(), Some("abc"));
    }

    #[test]
    fn test_page_without_studies() {
        let page = json!({ "nextPageToken": "" });
        assert!(normalize_page(&page).is_empty());
        assert_eq!(next_page_token(&page), None);
    }

    #[test]
    fn test_site_locations() {
        let raw = json!({
            "protocolSection": {
                "contactsLocationsModule": {
                    "locations": [
                        { "facility": "NIH Clinical Center", "city": "Bethesda", "country": "United States",
                          "geoPoint": { "lat": 39.00035, "lon": -77.10326 } },
                        { "city": "Toronto", "country": "Canada" },
                        { "facility": "Somewhere" }
                    ]
                }
            }
        });
        let locations = site_locations(&raw);

        assert_eq!(locations.len(), 3);
        assert_eq!(locations[0].geo_point, Some(GeoPoint::new(39.00035, -77.10326)));
        assert_eq!(locations[1].geo_point, None);
        assert_eq!(locations[2].country, "Unknown");
    }

    #[test]
    fn test_last_update_date() {
        let raw = json!({
            "protocolSection": {
                "statusModule": { "lastUpdatePostDateStruct": { "date": "2023-05-10" } }
            }
        });
        assert_eq!(last_update_date(&raw), Some("2023-05-10"));
        assert_eq!(last_update_date(&json!({})), None);
    }
}
