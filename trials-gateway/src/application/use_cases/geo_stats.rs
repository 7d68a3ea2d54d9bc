use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;
use trials_core::stats::country_counts;
use trials_core::{BoundingBox, NormalizedStudy, SiteLocation};

use crate::application::GatewayError;
use crate::application::ports::{RequestRateLimiter, StudySource};
use crate::domain::{GeoFilter, StudySearch};

const RADIUS_FIELDS: [&str; 3] = [
    "protocolSection.identificationModule.nctId",
    "protocolSection.identificationModule.briefTitle",
    "protocolSection.contactsLocationsModule.locations",
];

pub const DEFAULT_RADIUS: &str = "50mi";

pub const DEFAULT_GEO_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct GeoStatsQuery {
    pub condition: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Distance with unit, e.g. `50mi` or `100km`
    pub radius: String,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct GeoBoundsQuery {
    pub condition: String,
    pub bounds: BoundingBox,
    pub page_size: u32,
}

/// Site counts per country around a point
#[derive(Debug, Clone, PartialEq)]
pub struct CountryBreakdown {
    /// Raw studies returned by the registry, before normalization
    pub total_studies: usize,
    pub country_counts: IndexMap<String, usize>,
}

/// Studies with at least one site inside a bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct StudiesInBounds {
    pub studies: Vec<NormalizedStudy>,
    /// Counts over the in-box sites only
    pub country_counts: IndexMap<String, usize>,
}

/// Geographic aggregations over site locations
pub struct GeoStatsUseCase<S, R>
where
    S: StudySource + ?Sized,
    R: RequestRateLimiter + ?Sized,
{
    studies: Arc<S>,
    rate_limiter: Arc<R>,
}

impl<S, R> GeoStatsUseCase<S, R>
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

    /// Country breakdown of the sites of studies within `radius` of a point
    pub async fn around_point(
        &self,
        client_id: &str,
        query: GeoStatsQuery,
    ) -> Result<CountryBreakdown, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;

        if !(-90.0..=90.0).contains(&query.latitude) {
            return Err(GatewayError::validation("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&query.longitude) {
            return Err(GatewayError::validation("longitude must be within [-180, 180]"));
        }
        if query.radius.trim().is_empty() {
            return Err(GatewayError::validation("radius must not be empty"));
        }

        let search = StudySearch::for_condition(query.condition)
            .with_geo(GeoFilter::Distance {
                lat: query.latitude,
                lon: query.longitude,
                radius: query.radius,
            })
            .with_fields(RADIUS_FIELDS)
            .with_page_size(query.page_size);

        let page = self.studies.search_studies(&search).await?;
        let locations: Vec<SiteLocation> = page
            .studies()
            .iter()
            .flat_map(trials_core::site_locations)
            .collect();

        Ok(CountryBreakdown {
            total_studies: page.studies().len(),
            country_counts: country_counts(&locations),
        })
    }

    /// Studies with a site inside `bounds`
    ///
    /// The box is sent upstream as the smallest distance filter around its
    /// centre that covers it; sites outside the box are then discarded.
    pub async fn within_bounds(
        &self,
        client_id: &str,
        query: GeoBoundsQuery,
    ) -> Result<StudiesInBounds, GatewayError> {
        self.rate_limiter.check_and_consume(client_id).await?;

        let center = query.bounds.center();
        let search = StudySearch::for_condition(query.condition)
            .with_geo(GeoFilter::Distance {
                lat: center.lat,
                lon: center.lon,
                radius: format!("{}km", query.bounds.covering_radius_km()),
            })
            .with_page_size(query.page_size);

        let page = self.studies.search_studies(&search).await?;

        let mut studies = Vec::new();
        let mut inside = Vec::new();
        for raw in page.studies() {
            let Some(study) = trials_core::normalize(raw) else {
                continue;
            };
            let sites: Vec<SiteLocation> = trials_core::site_locations(raw)
                .into_iter()
                .filter(|site| {
                    site.geo_point
                        .is_some_and(|point| query.bounds.contains(&point))
                })
                .collect();
            if sites.is_empty() {
                continue;
            }
            studies.push(study);
            inside.extend(sites);
        }

        debug!(
            received = page.studies().len(),
            kept = studies.len(),
            "Filtered studies to bounding box"
        );

        Ok(StudiesInBounds {
            studies,
            country_counts: country_counts(&inside),
        })
    }
}
