use std::fmt;

/// Condition searched when the client does not name one
pub const DEFAULT_CONDITION: &str = "cancer";

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page the registry serves
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`
pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

/// Query against the registry `/studies` collection
///
/// Empty collections and `None` fields are left out of the upstream request.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySearch {
    pub condition: String,
    pub term: Option<String>,
    pub overall_status: Vec<String>,
    pub geo: Option<GeoFilter>,
    pub advanced_filter: Option<String>,
    pub fields: Vec<String>,
    pub sort: Vec<SortKey>,
    pub page_size: u32,
    pub page_token: Option<String>,
}

impl Default for StudySearch {
    fn default() -> Self {
        StudySearch {
            condition: DEFAULT_CONDITION.to_string(),
            term: None,
            overall_status: Vec::new(),
            geo: None,
            advanced_filter: None,
            fields: Vec::new(),
            sort: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            page_token: None,
        }
    }
}

impl StudySearch {
    pub fn for_condition(condition: impl Into<String>) -> Self {
        StudySearch {
            condition: condition.into(),
            ..Default::default()
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = clamp_page_size(page_size);
        self
    }

    pub fn with_page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }

    pub fn with_term(mut self, term: Option<String>) -> Self {
        self.term = term;
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<String>) -> Self {
        self.overall_status = statuses;
        self
    }

    pub fn with_geo(mut self, geo: GeoFilter) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn with_advanced_filter(mut self, filter: impl Into<String>) -> Self {
        self.advanced_filter = Some(filter.into());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }
}

/// Value of the registry `filter.geo` parameter
#[derive(Debug, Clone, PartialEq)]
pub enum GeoFilter {
    /// `distance(lat,lon,radius)`; radius carries its unit, e.g. `50mi` or `120km`
    Distance { lat: f64, lon: f64, radius: String },
    /// Client supplied expression, passed through untouched
    Raw(String),
}

impl fmt::Display for GeoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoFilter::Distance { lat, lon, radius } => {
                write!(f, "distance({},{},{})", lat, lon, radius)
            }
            GeoFilter::Raw(expression) => f.write_str(expression),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl TryFrom<&str> for SortOrder {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("sort order must be asc or desc, got '{}'", other)),
        }
    }
}

/// One `field:order` entry of the registry `sort` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        SortKey {
            field: field.into(),
            order,
        }
    }

    /// Pair sort fields with their orders
    ///
    /// With no orders every field sorts ascending. Otherwise both lists must
    /// have the same length.
    pub fn pair(fields: &[String], orders: &[String]) -> Result<Vec<SortKey>, String> {
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err("sort_by fields must not be empty".to_string());
        }
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        if orders.is_empty() {
            return Ok(fields
                .iter()
                .map(|field| SortKey::new(field.trim(), SortOrder::Asc))
                .collect());
        }
        if fields.len() != orders.len() {
            return Err(
                "The number of sort_by fields must match the number of sort_order fields."
                    .to_string(),
            );
        }

        fields
            .iter()
            .zip(orders)
            .map(|(field, order)| {
                SortOrder::try_from(order.as_str()).map(|order| SortKey::new(field.trim(), order))
            })
            .collect()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.order.as_str())
    }
}
