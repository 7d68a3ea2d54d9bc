use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::sync::Arc;
use trials_core::{BoundingBox, EnrollmentInsights, EnrollmentStats};

use crate::application::{
    DEFAULT_GEO_PAGE_SIZE, DEFAULT_RADIUS, DEFAULT_START_YEAR, EnrichedStudiesQuery,
    EnrichedStudiesUseCase, EnrollmentUseCase, FilteredStudiesQuery, FilteredStudiesUseCase,
    GeoBoundsQuery, GeoStatsQuery, GeoStatsUseCase, ParticipantFlowOutcome, ReferenceDataUseCase,
    RegistryApi, SortedStudiesQuery, SortedStudiesUseCase, StudyDetailsUseCase, TimeStatsUseCase,
};
use crate::domain::{
    Clock, DEFAULT_CONDITION, DEFAULT_PAGE_SIZE, GeoFilter, MAX_PAGE_SIZE, StudySearch,
};
use crate::infrastructure::TokenBucketRateLimiter;
use crate::presentation::rest::{
    ApiError,
    dto::*,
    params::{ClientId, QueryParams},
};

use super::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /api/filtered-studies
pub async fn filtered_studies<C: Clock>(
    client: ClientId,
    params: QueryParams,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<StudyListResponse> {
    let mut search = StudySearch::for_condition(params.string_or("condition", DEFAULT_CONDITION))
        .with_page_size(params.page_size(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?)
        .with_page_token(params.get("page_token").map(str::to_string))
        .with_term(params.get("search_term").map(str::to_string))
        .with_statuses(params.all("overall_status"));
    if let Some(location) = params.get("location_str") {
        search = search.with_geo(GeoFilter::Raw(location.to_string()));
    }
    if let Some(filter) = params.get("advanced_filter") {
        search = search.with_advanced_filter(filter);
    }

    let use_case =
        FilteredStudiesUseCase::new(Arc::clone(&state.registry), Arc::clone(&state.rate_limiter));
    let listing = use_case
        .execute(
            client.as_str(),
            FilteredStudiesQuery {
                search,
                only_with_results: params.flag("only_with_results")?,
            },
        )
        .await?;

    Ok(Json(listing.into()))
}

/// GET /api/filtered-studies/geo-bounds
pub async fn geo_bounds<C: Clock>(
    client: ClientId,
    params: QueryParams,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<StudiesInBoundsResponse> {
    let bounds = BoundingBox::new(
        params.parsed_required("north")?,
        params.parsed_required("south")?,
        params.parsed_required("east")?,
        params.parsed_required("west")?,
    )
    .map_err(|reason| ApiError::invalid_parameter("bounds", &reason))?;

    let use_case =
        GeoStatsUseCase::new(Arc::clone(&state.registry), Arc::clone(&state.rate_limiter));
    let result = use_case
        .within_bounds(
            client.as_str(),
            GeoBoundsQuery {
                condition: params.string_or("condition", DEFAULT_CONDITION),
                bounds,
                page_size: params.page_size(DEFAULT_GEO_PAGE_SIZE, MAX_PAGE_SIZE)?,
            },
        )
        .await?;

    Ok(Json(result.into()))
}

/// GET /api/sorted-studies/multiple-fields
pub async fn sorted_studies<C: Clock>(
    client: ClientId,
    params: QueryParams,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<StudyListResponse> {
    let query = SortedStudiesQuery {
        sort_by: params.all("sort_by"),
        sort_order: params.all("sort_order"),
        page_size: params.page_size(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?,
        page_token: params.get("page_token").map(str::to_string),
    };

    let use_case =
        SortedStudiesUseCase::new(Arc::clone(&state.registry), Arc::clone(&state.rate_limiter));
    let listing = use_case.execute(client.as_str(), query).await?;

    Ok(Json(listing.into()))
}

/// GET /api/enriched-studies/multi-conditions
pub async fn enriched_studies<C: Clock>(
    client: ClientId,
    params: QueryParams,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<EnrichedStudiesResponse> {
    let query = EnrichedStudiesQuery {
        conditions: params.all("conditions"),
        page_size: params.page_size(DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?,
        page_token: params.get("page_token").map(str::to_string),
    };

    let use_case = EnrichedStudiesUseCase::new(
        Arc::clone(&state.registry),
        Arc::clone(&state.rate_limiter),
        Arc::clone(&state.clock),
    );
    let result = use_case.execute(client.as_str(), query).await?;

    Ok(Json(result.into()))
}

/// GET /api/studies/{nct_id}
pub async fn study<C: Clock>(
    client: ClientId,
    Path(nct_id): Path<String>,
    params: QueryParams,
    State(state): State<Arc<AppState<C>>>,
) -> Result<Response, ApiError> {
    let use_case =
        StudyDetailsUseCase::new(Arc::clone(&state.registry), Arc::clone(&state.rate_limiter));
    let study = use_case
        .get(client.as_str(), &nct_id, &params.all("fields"))
        .await?;

    Ok(match study {
        Some(study) => Json(study).into_response(),
        None => Json(MessageResponse::new("No data returned")).into_response(),
    })
}

/// GET /api/study-results/participant-flow/{nct_id}
pub async fn participant_flow<C: Clock>(
    client: ClientId,
    Path(nct_id): Path<String>,
    State(state): State<Arc<AppState<C>>>,
) -> Result<Response, ApiError> {
    let use_case =
        StudyDetailsUseCase::new(Arc::clone(&state.registry), Arc::clone(&state.rate_limiter));
    let outcome = use_case.participant_flow(client.as_str(), &nct_id).await?;

    Ok(match outcome {
        ParticipantFlowOutcome::Funnel(funnel) => Json(FunnelResponse { funnel }).into_response(),
        ParticipantFlowOutcome::NoParticipantFlow => Json(json!({ "funnel": {} })).into_response(),
        ParticipantFlowOutcome::NoResults => {
            Json(MessageResponse::new("No results section found for this study")).into_response()
        }
    })
}

fn reference_data<C: Clock>(
    state: &AppState<C>,
) -> ReferenceDataUseCase<dyn RegistryApi, TokenBucketRateLimiter<C>> {
    ReferenceDataUseCase::new(Arc::clone(&state.registry), Arc::clone(&state.rate_limiter))
}

/// GET /api/enums
pub async fn enums<C: Clock>(
    client: ClientId,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<Value> {
    Ok(Json(reference_data(&state).enums(client.as_str()).await?))
}

/// GET /api/search-areas
pub async fn search_areas<C: Clock>(
    client: ClientId,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<Value> {
    Ok(Json(
        reference_data(&state).search_areas(client.as_str()).await?,
    ))
}

/// GET /api/stats/size
pub async fn size_stats<C: Clock>(
    client: ClientId,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<Value> {
    Ok(Json(reference_data(&state).size_stats(client.as_str()).await?))
}

/// GET /api/stats/field/values
pub async fn field_values<C: Clock>(
    client: ClientId,
    params: QueryParams,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<Value> {
    let values = reference_data(&state)
        .field_values(
            client.as_str(),
            &params.all("fields"),
            &params.all("field_types"),
        )
        .await?;
    Ok(Json(values))
}

/// GET /api/geo-stats
pub async fn geo_stats<C: Clock>(
    client: ClientId,
    params: QueryParams,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<GeoStatsResponse> {
    let query = GeoStatsQuery {
        condition: params.required("condition")?,
        latitude: params.parsed_required("latitude")?,
        longitude: params.parsed_required("longitude")?,
        radius: params.string_or("radius", DEFAULT_RADIUS),
        page_size: params.page_size(DEFAULT_GEO_PAGE_SIZE, MAX_PAGE_SIZE)?,
    };

    let use_case =
        GeoStatsUseCase::new(Arc::clone(&state.registry), Arc::clone(&state.rate_limiter));
    let breakdown = use_case.around_point(client.as_str(), query).await?;

    Ok(Json(breakdown.into()))
}

/// GET /api/time-stats
pub async fn time_stats<C: Clock>(
    client: ClientId,
    params: QueryParams,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<TimeStatsResponse> {
    let condition = params.required("condition")?;
    let start_year = params
        .parsed("start_year")?
        .unwrap_or(DEFAULT_START_YEAR);

    let use_case =
        TimeStatsUseCase::new(Arc::clone(&state.registry), Arc::clone(&state.rate_limiter));
    let breakdown = use_case
        .execute(client.as_str(), condition, start_year)
        .await?;

    Ok(Json(breakdown.into()))
}

fn enrollment<C: Clock>(
    state: &AppState<C>,
) -> EnrollmentUseCase<dyn RegistryApi, TokenBucketRateLimiter<C>> {
    EnrollmentUseCase::new(
        Arc::clone(&state.registry),
        Arc::clone(&state.rate_limiter),
        state.pagination.clone(),
    )
}

/// GET /api/enrollment-insights
pub async fn enrollment_insights<C: Clock>(
    client: ClientId,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<EnrollmentInsights> {
    Ok(Json(enrollment(&state).insights(client.as_str()).await?))
}

/// GET /api/enrollment-stats
pub async fn enrollment_stats<C: Clock>(
    client: ClientId,
    params: QueryParams,
    State(state): State<Arc<AppState<C>>>,
) -> ApiResult<EnrollmentStats> {
    let condition = params.string_or("condition", DEFAULT_CONDITION);
    let max_pages = params.parsed("max_pages")?;

    let stats = enrollment(&state)
        .stats(client.as_str(), condition, max_pages)
        .await?;
    Ok(Json(stats))
}
