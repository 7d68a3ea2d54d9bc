//! Integration tests for the REST API
//!
//! Drives the full router against an in-memory registry:
//! - Listing, sorting and enrichment endpoints
//! - Geographic, time and enrollment statistics
//! - Single-study lookups and error passthrough
//! - Rate limiting per client

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header::RETRY_AFTER},
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;
use trials_gateway::{
    FetchError, PaginationConfig, RateLimitConfig, ReferenceDataSource, SimulationClock,
    StudyPage, StudySearch, StudySource, TokenBucketRateLimiter,
    presentation::rest::{AppState, TrustedProxies, create_router},
};

// ============================================================================
// Test Fixtures
// ============================================================================

/// In-memory registry: serves `pages` in token order and records every search
#[derive(Default)]
struct FakeRegistry {
    pages: Vec<Vec<Value>>,
    studies: HashMap<String, Value>,
    searches: Mutex<Vec<StudySearch>>,
}

impl FakeRegistry {
    fn with_pages(pages: Vec<Vec<Value>>) -> Self {
        FakeRegistry {
            pages,
            ..Default::default()
        }
    }

    fn with_study(mut self, nct_id: &str, record: Value) -> Self {
        self.studies.insert(nct_id.to_string(), record);
        self
    }

    fn searches(&self) -> Vec<StudySearch> {
        self.searches.lock().clone()
    }
}

#[async_trait]
impl StudySource for FakeRegistry {
    async fn search_studies(&self, search: &StudySearch) -> Result<StudyPage, FetchError> {
        self.searches.lock().push(search.clone());

        let index = search
            .page_token
            .as_deref()
            .and_then(|token| token.strip_prefix('p'))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);

        let studies: Vec<Value> = self
            .pages
            .get(index)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|study| {
                search.overall_status.is_empty()
                    || study
                        .pointer("/protocolSection/statusModule/overallStatus")
                        .and_then(Value::as_str)
                        .is_some_and(|s| search.overall_status.iter().any(|w| w == s))
            })
            .take(search.page_size as usize)
            .collect();

        let mut page = json!({ "studies": studies });
        if index + 1 < self.pages.len() {
            page["nextPageToken"] = json!(format!("p{}", index + 1));
        }
        Ok(StudyPage(page))
    }

    async fn get_study(&self, nct_id: &str, _fields: &[String]) -> Result<Value, FetchError> {
        self.studies
            .get(nct_id)
            .cloned()
            .ok_or_else(|| FetchError::Upstream {
                status: 404,
                body: format!("Study {} not found", nct_id),
            })
    }
}

#[async_trait]
impl ReferenceDataSource for FakeRegistry {
    async fn study_enums(&self) -> Result<Value, FetchError> {
        Ok(json!([{ "type": "Status", "values": ["RECRUITING", "COMPLETED"] }]))
    }

    async fn search_areas(&self) -> Result<Value, FetchError> {
        Ok(json!([{ "name": "ConditionSearch" }]))
    }

    async fn field_values(&self, fields: &[String], types: &[String]) -> Result<Value, FetchError> {
        Ok(json!({ "fields": fields, "types": types }))
    }

    async fn size_stats(&self) -> Result<Value, FetchError> {
        Ok(json!({ "totalStudies": 3 }))
    }
}

#[derive(Default)]
struct StudyFixture {
    id: String,
    title: Option<&'static str>,
    status: &'static str,
    has_results: bool,
    enrollment: Option<u64>,
    start_date: Option<&'static str>,
    last_update: Option<&'static str>,
    conditions: Vec<&'static str>,
    locations: Vec<Value>,
}

impl StudyFixture {
    fn new(id: impl Into<String>) -> Self {
        StudyFixture {
            id: id.into(),
            title: Some("A study"),
            status: "RECRUITING",
            ..Default::default()
        }
    }

    fn build(self) -> Value {
        let mut identification = json!({ "nctId": self.id });
        if let Some(title) = self.title {
            identification["briefTitle"] = json!(title);
        }
        let mut status = json!({ "overallStatus": self.status });
        if let Some(date) = self.start_date {
            status["startDateStruct"] = json!({ "date": date });
        }
        if let Some(date) = self.last_update {
            status["lastUpdatePostDateStruct"] = json!({ "date": date });
        }
        let mut design = json!({});
        if let Some(count) = self.enrollment {
            design["enrollmentInfo"] = json!({ "count": count });
        }

        json!({
            "hasResults": self.has_results,
            "protocolSection": {
                "identificationModule": identification,
                "statusModule": status,
                "designModule": design,
                "conditionsModule": { "conditions": self.conditions },
                "contactsLocationsModule": { "locations": self.locations }
            }
        })
    }
}

fn site(country: &str, lat: f64, lon: f64) -> Value {
    json!({ "facility": "Site", "city": "City", "country": country, "geoPoint": { "lat": lat, "lon": lon } })
}

fn clock_2024() -> Arc<SimulationClock> {
    let time: DateTime<Utc> = "2024-06-01T00:00:00Z".parse().unwrap();
    Arc::new(SimulationClock::at(time))
}

fn app_with(registry: Arc<FakeRegistry>) -> Router {
    app_with_limits(registry, RateLimitConfig::default())
}

fn app_with_limits(registry: Arc<FakeRegistry>, limits: RateLimitConfig) -> Router {
    app_behind(registry, limits, TrustedProxies::default())
}

fn app_behind(
    registry: Arc<FakeRegistry>,
    limits: RateLimitConfig,
    trusted_proxies: TrustedProxies,
) -> Router {
    let clock = clock_2024();
    let rate_limiter = Arc::new(TokenBucketRateLimiter::new(limits, Arc::clone(&clock)));
    let state = AppState::new(
        clock,
        rate_limiter,
        registry,
        PaginationConfig::default(),
    )
    .with_trusted_proxies(trusted_proxies);
    create_router(Arc::new(state))
}

/// Request as received on a connection from `peer`
fn request_from(uri: &str, peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = forwarded_for {
        builder = builder.header("X-Forwarded-For", value);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    let addr = SocketAddr::new(peer.parse().unwrap(), 40000);
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    get_from(app, uri, "198.51.100.1").await
}

async fn get_from(app: &Router, uri: &str, peer: &str) -> (StatusCode, Value) {
    send(app, request_from(uri, peer, None)).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_with(Arc::new(FakeRegistry::default()));

    let (status, json) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_filtered_studies_recruiting_with_results() {
    let studies: Vec<Value> = (0..12)
        .map(|i| {
            let mut fixture = StudyFixture::new(format!("NCT{:08}", i));
            fixture.status = if i % 3 == 0 { "COMPLETED" } else { "RECRUITING" };
            fixture.has_results = i % 2 == 0;
            fixture.build()
        })
        .collect();
    let registry = Arc::new(FakeRegistry::with_pages(vec![studies]));
    let app = app_with(Arc::clone(&registry));

    let (status, json) = get(
        &app,
        "/api/filtered-studies?condition=asthma&page_size=5&overall_status=RECRUITING&only_with_results=true",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let returned = json["studies"].as_array().unwrap();
    assert!(returned.len() <= 5);
    assert!(!returned.is_empty());
    assert_eq!(json["count"], json!(returned.len()));
    for study in returned {
        assert_eq!(study["status"], "RECRUITING");
        assert_eq!(study["hasResults"], true);
    }

    let search = &registry.searches()[0];
    assert_eq!(search.condition, "asthma");
    assert_eq!(search.page_size, 5);
    assert_eq!(search.overall_status, vec!["RECRUITING".to_string()]);
}

#[tokio::test]
async fn test_filtered_studies_drops_incomplete_records() {
    let mut untitled = StudyFixture::new("NCT00000002");
    untitled.title = None;
    let registry = Arc::new(FakeRegistry::with_pages(vec![
        vec![StudyFixture::new("NCT00000001").build(), untitled.build()],
        vec![],
    ]));
    let app = app_with(registry);

    let (status, json) = get(&app, "/api/filtered-studies").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["studies"][0]["id"], "NCT00000001");
    assert_eq!(json["studies"][0]["enrollmentCount"], Value::Null);
    assert_eq!(json["nextPageToken"], "p1");
}

#[tokio::test]
async fn test_filtered_studies_rejects_bad_page_size() {
    let app = app_with(Arc::new(FakeRegistry::default()));

    let (status, json) = get(&app, "/api/filtered-studies?page_size=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], -1100);

    let (status, _) = get(&app, "/api/filtered-studies?page_size=1001").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sorted_studies_builds_sort_keys() {
    let registry = Arc::new(FakeRegistry::with_pages(vec![vec![
        StudyFixture::new("NCT00000001").build(),
    ]]));
    let app = app_with(Arc::clone(&registry));

    let (status, json) = get(
        &app,
        "/api/sorted-studies/multiple-fields?sort_by=EnrollmentCount&sort_by=StartDate&sort_order=desc&sort_order=asc",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    let sort: Vec<String> = registry.searches()[0]
        .sort
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(sort, vec!["EnrollmentCount:desc", "StartDate:asc"]);
}

#[tokio::test]
async fn test_sorted_studies_mismatched_orders() {
    let registry = Arc::new(FakeRegistry::default());
    let app = app_with(Arc::clone(&registry));

    let (status, json) = get(
        &app,
        "/api/sorted-studies/multiple-fields?sort_by=EnrollmentCount&sort_by=StartDate&sort_order=desc",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["msg"],
        "The number of sort_by fields must match the number of sort_order fields."
    );
    assert!(registry.searches().is_empty());
}

#[tokio::test]
async fn test_enriched_studies() {
    let mut first = StudyFixture::new("NCT00000001");
    first.enrollment = Some(100);
    first.start_date = Some("2020-01-01");
    first.conditions = vec!["cancer", "diabetes"];
    let mut second = StudyFixture::new("NCT00000002");
    second.enrollment = Some(40);
    second.conditions = vec!["cancer"];

    let registry = Arc::new(FakeRegistry::with_pages(vec![vec![
        first.build(),
        second.build(),
    ]]));
    let app = app_with(Arc::clone(&registry));

    let (status, json) = get(
        &app,
        "/api/enriched-studies/multi-conditions?conditions=cancer&conditions=diabetes",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["studies"][0]["enrollmentRate"], 25.0);
    assert_eq!(json["studies"][1].get("enrollmentRate"), Some(&Value::Null));
    assert_eq!(json["conditionCounts"], json!({ "cancer": 2, "diabetes": 1 }));
    assert_eq!(registry.searches()[0].condition, "cancer AND diabetes");
}

// ============================================================================
// Single study
// ============================================================================

#[tokio::test]
async fn test_study_lookup_and_upstream_404() {
    let record = StudyFixture::new("NCT04280705").build();
    let registry = Arc::new(
        FakeRegistry::default()
            .with_study("NCT04280705", record.clone())
            .with_study("NCT00000000", json!({})),
    );
    let app = app_with(registry);

    let (status, json) = get(&app, "/api/studies/NCT04280705?fields=protocolSection").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, record);

    let (status, json) = get(&app, "/api/studies/NCT00000000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "message": "No data returned" }));

    let (status, json) = get(&app, "/api/studies/NCT99999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], -2000);
}

#[tokio::test]
async fn test_participant_flow_outcomes() {
    let with_flow = json!({
        "resultsSection": {
            "participantFlowModule": {
                "periods": [{
                    "milestones": [
                        { "type": "STARTED", "achievements": [{ "flowAchievementNumSubjects": "100" }] },
                        { "type": "completed", "achievements": [{ "flowAchievementNumSubjects": "80" }] }
                    ],
                    "dropWithdraws": [
                        { "type": "Adverse Event", "reasons": [{ "numSubjects": "12" }] },
                        { "reasons": [{ "numSubjects": "8" }] }
                    ]
                }]
            }
        }
    });
    let registry = Arc::new(
        FakeRegistry::default()
            .with_study("NCT00000001", with_flow)
            .with_study("NCT00000002", json!({ "protocolSection": {} }))
            .with_study(
                "NCT00000003",
                json!({ "resultsSection": { "baselineCharacteristicsModule": {} } }),
            ),
    );
    let app = app_with(registry);

    let (status, json) = get(&app, "/api/study-results/participant-flow/NCT00000001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["funnel"]["totalStarted"], 100);
    assert_eq!(json["funnel"]["totalCompleted"], 80);
    assert_eq!(json["funnel"]["totalDropped"], 20);
    assert_eq!(
        json["funnel"]["dropReasons"],
        json!({ "Adverse Event": 12, "Unknown": 8 })
    );

    let (_, json) = get(&app, "/api/study-results/participant-flow/NCT00000002").await;
    assert_eq!(
        json,
        json!({ "message": "No results section found for this study" })
    );

    let (_, json) = get(&app, "/api/study-results/participant-flow/NCT00000003").await;
    assert_eq!(json, json!({ "funnel": {} }));
}

#[tokio::test]
async fn test_invalid_nct_id_rejected() {
    let app = app_with(Arc::new(FakeRegistry::default()));

    let (status, _) = get(&app, "/api/studies/NCT%2F..%2Fenums").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Reference data
// ============================================================================

#[tokio::test]
async fn test_reference_passthroughs() {
    let app = app_with(Arc::new(FakeRegistry::default()));

    let (status, json) = get(&app, "/api/enums").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["type"], "Status");

    let (_, json) = get(&app, "/api/search-areas").await;
    assert_eq!(json[0]["name"], "ConditionSearch");

    let (_, json) = get(&app, "/api/stats/size").await;
    assert_eq!(json["totalStudies"], 3);

    let (status, json) = get(
        &app,
        "/api/stats/field/values?fields=Phase&fields=OverallStatus&field_types=ENUM",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "fields": ["Phase", "OverallStatus"], "types": ["ENUM"] })
    );

    let (status, _) = get(&app, "/api/stats/field/values").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_geo_stats_counts_sites_per_country() {
    let mut first = StudyFixture::new("NCT00000001");
    first.locations = vec![site("United States", 39.0, -77.1), site("Canada", 45.4, -75.7)];
    let mut second = StudyFixture::new("NCT00000002");
    second.locations = vec![site("United States", 38.9, -77.0), json!({ "city": "Nowhere" })];
    let registry = Arc::new(FakeRegistry::with_pages(vec![vec![
        first.build(),
        second.build(),
    ]]));
    let app = app_with(Arc::clone(&registry));

    let (status, json) = get(
        &app,
        "/api/geo-stats?condition=cancer&latitude=39.0035707&longitude=-77.1013313",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalStudies"], 2);
    assert_eq!(
        json["countryCounts"],
        json!({ "United States": 2, "Canada": 1, "Unknown": 1 })
    );

    let search = &registry.searches()[0];
    assert_eq!(
        search.geo.as_ref().map(ToString::to_string).as_deref(),
        Some("distance(39.0035707,-77.1013313,50mi)")
    );
    assert_eq!(search.page_size, 100);
}

#[tokio::test]
async fn test_geo_stats_requires_coordinates() {
    let app = app_with(Arc::new(FakeRegistry::default()));

    let (status, json) = get(&app, "/api/geo-stats?condition=cancer&latitude=39").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["msg"], "Mandatory parameter 'longitude' was not sent");

    let (status, _) = get(&app, "/api/geo-stats?condition=cancer&latitude=91&longitude=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_geo_bounds_keeps_in_box_sites() {
    let mut inside = StudyFixture::new("NCT00000001");
    inside.locations = vec![site("United States", 39.0, -77.0), site("France", 48.8, 2.3)];
    let mut outside = StudyFixture::new("NCT00000002");
    outside.locations = vec![site("Canada", 45.4, -75.7)];
    let registry = Arc::new(FakeRegistry::with_pages(vec![vec![
        inside.build(),
        outside.build(),
    ]]));
    let app = app_with(Arc::clone(&registry));

    let (status, json) = get(
        &app,
        "/api/filtered-studies/geo-bounds?north=40&south=38&east=-76&west=-78",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 1);
    assert_eq!(json["studies"][0]["id"], "NCT00000001");
    assert_eq!(json["countryCounts"], json!({ "United States": 1 }));

    let geo = registry.searches()[0].geo.as_ref().unwrap().to_string();
    assert!(geo.starts_with("distance(39,-77,"));
    assert!(geo.ends_with("km)"));
}

#[tokio::test]
async fn test_geo_bounds_rejects_inverted_box() {
    let app = app_with(Arc::new(FakeRegistry::default()));

    let (status, _) = get(
        &app,
        "/api/filtered-studies/geo-bounds?north=38&south=40&east=-76&west=-78",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_time_stats_buckets_by_update_year() {
    let studies: Vec<Value> = [Some("2023-04-01"), Some("2024-01-15"), Some("2023-12-31"), None]
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let mut fixture = StudyFixture::new(format!("NCT{:08}", i));
            fixture.last_update = date;
            fixture.build()
        })
        .collect();
    let registry = Arc::new(FakeRegistry::with_pages(vec![studies]));
    let app = app_with(Arc::clone(&registry));

    let (status, json) = get(&app, "/api/time-stats?condition=asthma&start_year=2023").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalStudies"], 4);
    assert_eq!(json["yearBreakdown"], json!({ "2023": 2, "2024": 1 }));
    assert_eq!(
        registry.searches()[0].advanced_filter.as_deref(),
        Some("AREA[LastUpdatePostDate]RANGE[2023-01-01,MAX]")
    );

    let (status, _) = get(&app, "/api/time-stats?condition=asthma&start_year=23").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn enrollment_page(ids: std::ops::Range<u64>) -> Vec<Value> {
    ids.map(|i| {
        let mut fixture = StudyFixture::new(format!("NCT{:08}", i));
        fixture.enrollment = Some(i * 10);
        fixture.build()
    })
    .collect()
}

#[tokio::test]
async fn test_enrollment_stats_aggregates_pages() {
    let registry = Arc::new(FakeRegistry::with_pages(vec![
        enrollment_page(1..3),
        enrollment_page(3..5),
        enrollment_page(5..6),
    ]));
    let app = app_with(Arc::clone(&registry));

    let (status, json) = get(&app, "/api/enrollment-stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalStudies"], 5);
    assert_eq!(json["averageEnrollment"], 30.0);
    assert_eq!(json["medianEnrollment"], 30.0);
    assert_eq!(json["enrollmentPercentiles"]["0.5"], 30.0);
    assert_eq!(json["enrollmentRanges"].as_array().unwrap().len(), 10);
    assert_eq!(registry.searches().len(), 3);

    let (_, json) = get(&app, "/api/enrollment-stats?max_pages=1").await;
    assert_eq!(json["totalStudies"], 2);
}

#[tokio::test]
async fn test_enrollment_stats_without_counts_is_unprocessable() {
    let registry = Arc::new(FakeRegistry::with_pages(vec![vec![
        StudyFixture::new("NCT00000001").build(),
    ]]));
    let app = app_with(registry);

    let (status, json) = get(&app, "/api/enrollment-stats?condition=rare").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], -2002);
}

#[tokio::test]
async fn test_enrollment_insights() {
    let mut pages = enrollment_page(1..4);
    pages.push(StudyFixture::new("NCT00000099").build());
    let registry = Arc::new(FakeRegistry::with_pages(vec![pages]));
    let app = app_with(Arc::clone(&registry));

    let (status, json) = get(&app, "/api/enrollment-insights").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["averageEnrollment"], 20.0);
    assert_eq!(json["totalEnrollment"], 60);
    assert_eq!(
        json["enrollmentDistribution"],
        json!({ "10": 1, "20": 1, "30": 1 })
    );
    let search = &registry.searches()[0];
    assert_eq!(search.condition, "cancer");
    assert_eq!(search.page_size, 100);
}

// ============================================================================
// Rate Limiting
// ============================================================================

#[tokio::test]
async fn test_rate_limit_per_client() {
    let app = app_with(Arc::new(FakeRegistry::default()));

    for i in 0..50 {
        let (status, _) = get_from(&app, "/api/enums", "203.0.113.7").await;
        assert_eq!(status, StatusCode::OK, "request {} was rejected", i);
    }

    let response = app
        .clone()
        .oneshot(request_from("/api/enums", "203.0.113.7", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[RETRY_AFTER], "10");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], -1003);

    // Other clients keep their own budget
    let (status, _) = get_from(&app, "/api/enums", "203.0.113.8").await;
    assert_eq!(status, StatusCode::OK);

    // Health checks are never limited
    let (status, _) = get_from(&app, "/health", "203.0.113.7").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_for_from_direct_client_shares_peer_bucket() {
    let app = app_with(Arc::new(FakeRegistry::default()));

    let mut accepted = 0;
    for i in 0..60 {
        let forwarded = format!("192.0.2.{}", i);
        let (status, _) = send(
            &app,
            request_from("/api/enums", "198.51.100.9", Some(&forwarded)),
        )
        .await;
        if status == StatusCode::OK {
            accepted += 1;
        } else {
            assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        }
    }

    assert_eq!(accepted, 50);
}

#[tokio::test]
async fn test_trusted_proxy_forwards_client_identity() {
    let proxies = TrustedProxies::new(["10.0.0.1".parse().unwrap()]);
    let limits = RateLimitConfig {
        capacity: 1.0,
        refill_per_second: 0.1,
    };
    let app = app_behind(Arc::new(FakeRegistry::default()), limits, proxies);

    let (status, _) = send(
        &app,
        request_from("/api/enums", "10.0.0.1", Some("203.0.113.7, 10.0.0.1")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request_from("/api/enums", "10.0.0.1", Some("203.0.113.8")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request_from("/api/enums", "10.0.0.1", Some("203.0.113.7")),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_applies_before_validation() {
    let limits = RateLimitConfig {
        capacity: 1.0,
        refill_per_second: 0.1,
    };
    let app = app_with_limits(Arc::new(FakeRegistry::default()), limits);

    let (status, _) = get(&app, "/api/stats/field/values").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/stats/field/values").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}
