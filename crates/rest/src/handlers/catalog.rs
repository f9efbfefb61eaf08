//! Landing page, conformance and API description handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use satapi_search::types::response::{GEOJSON, JSON};
use satapi_search::{CatalogProvider, Link, SearchBackend};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::Endpoint;
use crate::state::AppState;

/// STAC version reported by the landing page.
pub const STAC_VERSION: &str = "1.0.0";

/// Media type of the OpenAPI description.
pub const OPENAPI: &str = "application/vnd.oai.openapi+json;version=3.0";

/// Conformance classes implemented by this server.
pub const CONFORMANCE_CLASSES: &[&str] = &[
    "https://api.stacspec.org/v1.0.0/core",
    "https://api.stacspec.org/v1.0.0/collections",
    "https://api.stacspec.org/v1.0.0/ogcapi-features",
    "https://api.stacspec.org/v1.0.0/item-search",
    "https://api.stacspec.org/v1.0.0/item-search#fields",
    "https://api.stacspec.org/v1.0.0/item-search#sort",
    "https://api.stacspec.org/v1.0.0-rc.1/item-search#query",
    "https://api.stacspec.org/v1.0.0-rc.1/item-search#context",
    "https://api.stacspec.org/v1.0.0/ogcapi-features#fields",
    "https://api.stacspec.org/v1.0.0/ogcapi-features#sort",
    "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/core",
    "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/geojson",
    "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/oas30",
];

/// Handler for the landing page.
///
/// Returns the root catalog with navigation links and a `child` link per
/// collection.
///
/// # HTTP Request
///
/// `GET [base]/`
pub async fn landing_handler<B>(
    State(state): State<AppState<B>>,
    endpoint: Endpoint,
) -> RestResult<Response>
where
    B: SearchBackend + CatalogProvider + 'static,
{
    debug!("Processing landing page request");

    let config = state.config();
    let root = endpoint.join("/");
    let search = endpoint.join("search");

    let mut links = vec![
        Link::new("self", root.clone()).with_type(JSON),
        Link::new("root", root).with_type(JSON),
        Link::new("conformance", endpoint.join("conformance")).with_type(JSON),
        Link::new("data", endpoint.join("collections")).with_type(JSON),
        Link::new("search", search.clone())
            .with_type(GEOJSON)
            .with_method("GET"),
        Link::new("search", search)
            .with_type(GEOJSON)
            .with_method("POST"),
        Link::new("service-desc", endpoint.join("api")).with_type(OPENAPI),
    ];

    let collections = state.engine().collections(endpoint.as_str()).await?;
    for collection in &collections {
        let Some(href) = self_href(collection) else {
            continue;
        };
        let mut child = Link::new("child", href).with_type(JSON);
        if let Some(title) = collection.get("title").and_then(Value::as_str) {
            child = child.with_title(title);
        }
        links.push(child);
    }

    let catalog = json!({
        "stac_version": STAC_VERSION,
        "type": "Catalog",
        "id": config.catalog_id,
        "title": config.catalog_title,
        "description": config.catalog_description,
        "conformsTo": CONFORMANCE_CLASSES,
        "links": links,
    });

    Ok((StatusCode::OK, Json(catalog)).into_response())
}

fn self_href(document: &Value) -> Option<&str> {
    document
        .get("links")?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some("self"))?
        .get("href")?
        .as_str()
}

/// Handler for the conformance declaration.
///
/// # HTTP Request
///
/// `GET [base]/conformance`
pub async fn conformance_handler() -> impl IntoResponse {
    Json(json!({ "conformsTo": CONFORMANCE_CLASSES }))
}

/// Handler for the OpenAPI description of the server.
///
/// # HTTP Request
///
/// `GET [base]/api`
pub async fn api_handler<B>(State(state): State<AppState<B>>, endpoint: Endpoint) -> Response
where
    B: SearchBackend + CatalogProvider + 'static,
{
    let document = openapi_document(state.config().catalog_title.as_str(), &endpoint);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, OPENAPI)],
        Json(document),
    )
        .into_response()
}

fn openapi_document(title: &str, endpoint: &Endpoint) -> Value {
    let search_params = json!([
        { "name": "bbox", "in": "query", "schema": { "type": "string" } },
        { "name": "intersects", "in": "query", "schema": { "type": "string" } },
        { "name": "datetime", "in": "query", "schema": { "type": "string" } },
        { "name": "ids", "in": "query", "schema": { "type": "string" } },
        { "name": "collections", "in": "query", "schema": { "type": "string" } },
        { "name": "query", "in": "query", "schema": { "type": "string" } },
        { "name": "sortby", "in": "query", "schema": { "type": "string" } },
        { "name": "fields", "in": "query", "schema": { "type": "string" } },
        { "name": "limit", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
        { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
    ]);
    let collection_id = json!({
        "name": "collectionId", "in": "path", "required": true, "schema": { "type": "string" }
    });
    let item_id = json!({
        "name": "itemId", "in": "path", "required": true, "schema": { "type": "string" }
    });
    let feature_collection = json!({
        "200": { "description": "A page of matching items",
                 "content": { "application/geo+json": { "schema": { "type": "object" } } } },
        "400": { "description": "Invalid search parameter" }
    });

    let read = |summary: &str, parameters: Value, found: &str| {
        json!({ "get": {
            "summary": summary,
            "parameters": parameters,
            "responses": {
                "200": { "description": found },
                "404": { "description": "Not found" }
            }
        } })
    };
    let search = |summary: &str, parameters: Value| {
        json!({
            "get": { "summary": summary, "parameters": parameters, "responses": feature_collection },
            "post": { "summary": summary, "responses": feature_collection }
        })
    };

    let mut paths = serde_json::Map::new();
    paths.insert("/".to_string(), read("Landing page", json!([]), "Root catalog"));
    paths.insert(
        "/conformance".to_string(),
        read("Conformance classes", json!([]), "Conformance declaration"),
    );
    paths.insert(
        "/collections".to_string(),
        read("List collections", json!([]), "Collections"),
    );
    paths.insert(
        "/collections/{collectionId}".to_string(),
        read("Read a collection", json!([collection_id]), "A collection"),
    );
    paths.insert(
        "/collections/{collectionId}/items".to_string(),
        search("Search items of a collection", json!([collection_id])),
    );
    paths.insert(
        "/collections/{collectionId}/items/{itemId}".to_string(),
        read("Read an item", json!([collection_id, item_id]), "An item"),
    );
    paths.insert("/search".to_string(), search("Search items", search_params));

    json!({
        "openapi": "3.0.3",
        "info": { "title": title, "version": env!("CARGO_PKG_VERSION") },
        "servers": [{ "url": endpoint.as_str() }],
        "paths": paths,
    })
}
