//! Request extractors shared by the handlers

use axum::extract::{ConnectInfo, FromRef, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use super::ApiError;

const UNKNOWN_CLIENT: &str = "unknown";

/// Reverse proxies whose `X-Forwarded-For` header names the real client
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<[IpAddr]>);

impl TrustedProxies {
    pub fn new(proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        TrustedProxies(proxies.into_iter().collect())
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.contains(ip)
    }
}

/// Rate-limit key of the caller
///
/// The TCP peer address, or the first `X-Forwarded-For` entry when the peer
/// is a trusted proxy. `unknown` when the peer address is not available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
    TrustedProxies: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let id = match peer {
            Some(ip) if TrustedProxies::from_ref(state).contains(&ip) => {
                forwarded_for(&parts.headers).unwrap_or_else(|| ip.to_string())
            }
            Some(ip) => ip.to_string(),
            None => UNKNOWN_CLIENT.to_string(),
        };
        Ok(ClientId(id))
    }
}

/// Query string as ordered name/value pairs
///
/// Unlike `Query<T>`, keeps every occurrence of a repeated parameter.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        QueryParams(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect(),
        )
    }

    /// First non-empty value of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, value)| key == name && !value.trim().is_empty())
            .map(|(_, value)| value.as_str())
    }

    /// Every non-empty value of a repeatable parameter, in request order
    pub fn all(&self, name: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(key, value)| key == name && !value.trim().is_empty())
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn string_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }

    pub fn required(&self, name: &str) -> Result<String, ApiError> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| ApiError::missing_parameter(name))
    }

    /// Parsed value, `None` when the parameter is absent
    pub fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, ApiError> {
        self.get(name)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::invalid_parameter(name, &format!("cannot parse '{}'", value)))
            })
            .transpose()
    }

    pub fn parsed_required<T: FromStr>(&self, name: &str) -> Result<T, ApiError> {
        self.parsed(name)?
            .ok_or_else(|| ApiError::missing_parameter(name))
    }

    /// Page size within `1..=max`, `default` when absent
    pub fn page_size(&self, default: u32, max: u32) -> Result<u32, ApiError> {
        let size = self.parsed::<u32>("page_size")?.unwrap_or(default);
        if !(1..=max).contains(&size) {
            return Err(ApiError::invalid_parameter(
                "page_size",
                &format!("must be between 1 and {}", max),
            ));
        }
        Ok(size)
    }

    /// Boolean flag; accepts true/false, 1/0, yes/no, on/off
    pub fn flag(&self, name: &str) -> Result<bool, ApiError> {
        match self.get(name).map(|v| v.trim().to_ascii_lowercase()) {
            None => Ok(false),
            Some(value) => match value.as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(ApiError::invalid_parameter(name, "must be a boolean")),
            },
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.uri.query().map(QueryParams::parse).unwrap_or_default())
    }
}
