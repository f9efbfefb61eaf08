//! STAC route configuration.

use axum::{Router, routing::get};
use satapi_search::{CatalogProvider, SearchBackend};

use crate::handlers;
use crate::state::AppState;

/// Creates all STAC API routes.
///
/// # Routes
///
/// ## Catalog
/// - `GET /` - Landing page
/// - `GET /api` - OpenAPI description
/// - `GET /conformance` - Conformance classes
/// - `GET /health` - Health check
///
/// ## Collections
/// - `GET /collections` - List collections
/// - `GET /collections/{collection_id}` - Read a collection
/// - `GET /collections/{collection_id}/items/{item_id}` - Read an item
///
/// ## Search
/// - `GET|POST /search` - Search all items
/// - `GET|POST /collections/{collection_id}/items` - Search one collection
///
/// Unknown paths answer `404 Not Found`.
pub fn create_routes<B>(state: AppState<B>) -> Router
where
    B: SearchBackend + CatalogProvider + 'static,
{
    Router::new()
        // Catalog routes
        .route("/", get(handlers::landing_handler::<B>))
        .route("/api", get(handlers::api_handler::<B>))
        .route("/conformance", get(handlers::conformance_handler))
        .route("/health", get(handlers::health_handler::<B>))
        // Search routes
        .route(
            "/search",
            get(handlers::search_get_handler::<B>).post(handlers::search_post_handler::<B>),
        )
        // Collection routes
        .route("/collections", get(handlers::collections_handler::<B>))
        .route(
            "/collections/{collection_id}",
            get(handlers::collection_handler::<B>),
        )
        .route(
            "/collections/{collection_id}/items",
            get(handlers::items_get_handler::<B>).post(handlers::items_post_handler::<B>),
        )
        .route(
            "/collections/{collection_id}/items/{item_id}",
            get(handlers::item_handler::<B>),
        )
        .fallback(handlers::not_found_handler)
        .with_state(state)
}
