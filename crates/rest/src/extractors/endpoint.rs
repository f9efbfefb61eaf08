//! Public endpoint extractor.
//!
//! Links in every response are absolute. Their root is, in order:
//!
//! 1. the configured base URL (`SATAPI_BASE_URL`)
//! 2. `X-Forwarded-Proto` + `X-Forwarded-Host`, when a proxy sets the host
//! 3. `http://` + the `Host` header
//! 4. `http://` + the bind address

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use satapi_search::{CatalogProvider, SearchBackend};

use crate::state::AppState;

/// Forwarded protocol header.
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Forwarded host header.
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// The public root URL of the API, without a trailing slash.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(endpoint: Endpoint) {
///     let search = format!("{}/search", endpoint);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(String);

impl Endpoint {
    /// Wraps a root URL.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self(url.trim_end_matches('/').to_string())
    }

    /// Returns the root URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds an absolute URL for `path`.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    /// Consumes the extractor and returns the root URL.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim())
        .filter(|v| !v.is_empty())
}

/// Derives the endpoint from request headers.
fn endpoint_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(host) = header_value(headers, X_FORWARDED_HOST) {
        let proto = header_value(headers, X_FORWARDED_PROTO).unwrap_or("http");
        return Some(format!("{}://{}", proto, host));
    }

    header_value(headers, header::HOST.as_str()).map(|host| format!("http://{}", host))
}

impl<B> FromRequestParts<AppState<B>> for Endpoint
where
    B: SearchBackend + CatalogProvider + 'static,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<B>,
    ) -> Result<Self, Self::Rejection> {
        let config = state.config();
        let url = match config.base_url() {
            Some(url) => url.to_string(),
            None => endpoint_from_headers(&parts.headers)
                .unwrap_or_else(|| format!("http://{}", config.socket_addr())),
        };
        Ok(Endpoint::new(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_headers_win_over_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:8080"));
        headers.insert(X_FORWARDED_HOST, HeaderValue::from_static("stac.example.com"));
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));

        assert_eq!(
            endpoint_from_headers(&headers).as_deref(),
            Some("https://stac.example.com")
        );
    }

    #[test]
    fn test_forwarded_host_defaults_to_http() {
        let mut headers = HeaderMap::new();
        headers.insert(
            X_FORWARDED_HOST,
            HeaderValue::from_static("a.example.com, b.example.com"),
        );
        assert_eq!(
            endpoint_from_headers(&headers).as_deref(),
            Some("http://a.example.com")
        );
    }

    #[test]
    fn test_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        assert_eq!(
            endpoint_from_headers(&headers).as_deref(),
            Some("http://localhost:3000")
        );
    }

    #[test]
    fn test_no_headers() {
        assert!(endpoint_from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_join() {
        let endpoint = Endpoint::new("https://stac.example.com/v1/");
        assert_eq!(endpoint.as_str(), "https://stac.example.com/v1");
        assert_eq!(
            endpoint.join("/collections"),
            "https://stac.example.com/v1/collections"
        );
    }
}
