//! Collection and item read handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use satapi_search::types::response::{GEOJSON, JSON};
use satapi_search::{CatalogProvider, Link, SearchBackend};
use serde_json::json;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::Endpoint;
use crate::state::AppState;

/// Handler for the collection listing.
///
/// # HTTP Request
///
/// `GET [base]/collections`
///
/// # Response
///
/// `{"collections": [...], "links": [...], "context": {"returned": n}}`
pub async fn collections_handler<B>(
    State(state): State<AppState<B>>,
    endpoint: Endpoint,
) -> RestResult<Response>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    debug!("Processing collections request");

    let collections = state.engine().collections(endpoint.as_str()).await?;
    let returned = collections.len();

    let body = json!({
        "collections": collections,
        "links": [
            Link::new("self", endpoint.join("collections")).with_type(JSON),
            Link::new("root", endpoint.join("/")).with_type(JSON),
        ],
        "context": {
            "page": 1,
            "limit": returned,
            "matched": returned,
            "returned": returned,
        },
    });

    Ok((StatusCode::OK, Json(body)).into_response())
}

/// Handler for a single collection.
///
/// # HTTP Request
///
/// `GET [base]/collections/{collection_id}`
///
/// # Response
///
/// - `200 OK` - The collection
/// - `404 Not Found` - No such collection
pub async fn collection_handler<B>(
    State(state): State<AppState<B>>,
    Path(collection_id): Path<String>,
    endpoint: Endpoint,
) -> RestResult<Response>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    debug!(collection = %collection_id, "Processing collection request");

    let collection = state
        .engine()
        .collection(&collection_id, endpoint.as_str())
        .await?;

    Ok((StatusCode::OK, Json(collection)).into_response())
}

/// Handler for a single item.
///
/// # HTTP Request
///
/// `GET [base]/collections/{collection_id}/items/{item_id}`
///
/// # Response
///
/// - `200 OK` - The item as a GeoJSON Feature
/// - `404 Not Found` - No such item in the collection
pub async fn item_handler<B>(
    State(state): State<AppState<B>>,
    Path((collection_id, item_id)): Path<(String, String)>,
    endpoint: Endpoint,
) -> RestResult<Response>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    debug!(collection = %collection_id, item = %item_id, "Processing item request");

    let item = state
        .engine()
        .item(&collection_id, &item_id, endpoint.as_str())
        .await?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, GEOJSON)], Json(item)).into_response())
}
