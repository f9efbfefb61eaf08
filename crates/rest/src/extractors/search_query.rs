//! GET search query extractor.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use satapi_search::RawSearchRequest;

/// A search request read from the URL query string.
///
/// The raw query string is kept so `self` and `next` links can echo it.
#[derive(Debug)]
pub struct SearchQuery(pub RawSearchRequest);

impl SearchQuery {
    /// Consumes the extractor and returns the request.
    pub fn into_inner(self) -> RawSearchRequest {
        self.0
    }
}

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or("");
        Ok(SearchQuery(RawSearchRequest::from_query_string(query)))
    }
}
