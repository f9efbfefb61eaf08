//! Item search handlers.
//!
//! `/search` and `/collections/{id}/items` share one code path; the latter
//! only adds the collection id from the path as the search scope. Both run
//! the installed hooks around the engine call.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use satapi_search::types::response::GEOJSON;
use satapi_search::{CatalogProvider, RawSearchRequest, SearchBackend};
use tracing::{debug, error};

use crate::error::{RestError, RestResult};
use crate::extractors::{Endpoint, SearchBody, SearchQuery};
use crate::hooks::RequestEnvelope;
use crate::state::AppState;

/// Handler for GET search.
///
/// # HTTP Request
///
/// `GET [base]/search?[parameters]`
pub async fn search_get_handler<B>(
    State(state): State<AppState<B>>,
    endpoint: Endpoint,
    SearchQuery(raw): SearchQuery,
) -> RestResult<Response>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    run_search(&state, endpoint, raw, None).await
}

/// Handler for POST search.
///
/// # HTTP Request
///
/// `POST [base]/search`
///
/// with a JSON body carrying the search parameters.
pub async fn search_post_handler<B>(
    State(state): State<AppState<B>>,
    endpoint: Endpoint,
    SearchBody(raw): SearchBody,
) -> RestResult<Response>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    run_search(&state, endpoint, raw, None).await
}

/// Handler for GET search scoped to a collection.
///
/// # HTTP Request
///
/// `GET [base]/collections/{collection_id}/items?[parameters]`
pub async fn items_get_handler<B>(
    State(state): State<AppState<B>>,
    Path(collection_id): Path<String>,
    endpoint: Endpoint,
    SearchQuery(raw): SearchQuery,
) -> RestResult<Response>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    run_search(&state, endpoint, raw, Some(collection_id)).await
}

/// Handler for POST search scoped to a collection.
///
/// # HTTP Request
///
/// `POST [base]/collections/{collection_id}/items`
pub async fn items_post_handler<B>(
    State(state): State<AppState<B>>,
    Path(collection_id): Path<String>,
    endpoint: Endpoint,
    SearchBody(raw): SearchBody,
) -> RestResult<Response>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    run_search(&state, endpoint, raw, Some(collection_id)).await
}

async fn run_search<B>(
    state: &AppState<B>,
    endpoint: Endpoint,
    raw: RawSearchRequest,
    scope: Option<String>,
) -> RestResult<Response>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    debug!(
        transport = %raw.transport,
        scope = scope.as_deref().unwrap_or(""),
        "Processing search request"
    );

    let request = state
        .hooks()
        .before_search(RequestEnvelope {
            raw,
            scope,
            endpoint: endpoint.into_inner(),
        })
        .await?;

    let page = state
        .engine()
        .search(&request.raw, request.scope.as_deref(), &request.endpoint)
        .await?;

    let body = serde_json::to_value(&page).map_err(|e| {
        error!(error = %e, "Failed to serialize search response");
        RestError::Internal
    })?;
    let body = state.hooks().after_search(body).await?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, GEOJSON)], Json(body)).into_response())
}

/// Fallback for unknown routes.
pub async fn not_found_handler(uri: Uri) -> RestError {
    debug!(path = %uri.path(), "No route matched");
    RestError::NotFound {
        message: "Not Found".to_string(),
    }
}
