use serde::{Deserialize, Serialize};

/// Country label used when a site location omits one
pub const UNKNOWN_COUNTRY: &str = "Unknown";

const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS84 coordinate as published in `locations[].geoPoint`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }

    /// Great-circle distance in kilometres (haversine)
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// One trial site from the contacts/locations section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteLocation {
    pub facility: Option<String>,
    pub city: Option<String>,
    pub country: String,
    pub geo_point: Option<GeoPoint>,
}

impl SiteLocation {
    pub fn in_country(country: impl Into<String>) -> Self {
        SiteLocation {
            facility: None,
            city: None,
            country: country.into(),
            geo_point: None,
        }
    }
}

/// Axis-aligned latitude/longitude box
///
/// Boxes crossing the antimeridian are not supported: `west` must be below `east`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&north) || !(-90.0..=90.0).contains(&south) {
            return Err("latitude must be within [-90, 90]".to_string());
        }
        if !(-180.0..=180.0).contains(&east) || !(-180.0..=180.0).contains(&west) {
            return Err("longitude must be within [-180, 180]".to_string());
        }
        if south >= north {
            return Err("south must be below north".to_string());
        }
        if west >= east {
            return Err("west must be below east".to_string());
        }
        Ok(BoundingBox {
            north,
            south,
            east,
            west,
        })
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new((self.north + self.south) / 2.0, (self.east + self.west) / 2.0)
    }

    /// Smallest whole-kilometre radius around the centre that reaches every corner
    pub fn covering_radius_km(&self) -> f64 {
        let center = self.center();
        [
            GeoPoint::new(self.north, self.east),
            GeoPoint::new(self.north, self.west),
            GeoPoint::new(self.south, self.east),
            GeoPoint::new(self.south, self.west),
        ]
        .iter()
        .map(|corner| center.distance_km(corner))
        .fold(0.0_f64, f64::max)
        .ceil()
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lon)
    }
}
