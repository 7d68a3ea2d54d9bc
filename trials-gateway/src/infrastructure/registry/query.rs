//! Registry query-string encoding

use crate::domain::StudySearch;

pub type QueryParams = Vec<(&'static str, String)>;

/// Parameters of `GET /studies` for a search; absent options are omitted
pub fn search_params(search: &StudySearch) -> QueryParams {
    let mut params = vec![("pageSize", search.page_size.to_string())];

    if !search.condition.trim().is_empty() {
        params.push(("query.cond", search.condition.clone()));
    }
    push_opt(&mut params, "query.term", search.term.as_deref());
    push_opt(&mut params, "pageToken", search.page_token.as_deref());
    push_joined(&mut params, "filter.overallStatus", &search.overall_status);
    if let Some(geo) = &search.geo {
        params.push(("filter.geo", geo.to_string()));
    }
    push_opt(
        &mut params,
        "filter.advanced",
        search.advanced_filter.as_deref(),
    );
    push_joined(&mut params, "fields", &search.fields);
    let sort: Vec<String> = search.sort.iter().map(ToString::to_string).collect();
    push_joined(&mut params, "sort", &sort);

    params
}

/// `fields` for a single-study lookup
pub fn study_params(fields: &[String]) -> QueryParams {
    let mut params = Vec::new();
    push_joined(&mut params, "fields", fields);
    params
}

/// Parameters of `GET /stats/field/values`
pub fn field_value_params(fields: &[String], types: &[String]) -> QueryParams {
    let mut params = Vec::new();
    push_joined(&mut params, "fields", fields);
    push_joined(&mut params, "types", types);
    params
}

fn push_opt(params: &mut QueryParams, name: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.push((name, value.to_string()));
    }
}

fn push_joined(params: &mut QueryParams, name: &'static str, values: &[String]) {
    if !values.is_empty() {
        params.push((name, values.join(",")));
    }
}
