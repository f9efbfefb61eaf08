//! STAC API REST server
//!
//! This crate exposes the [`satapi_search`] engine over HTTP following the
//! STAC API specification (core, collections, item-search with the fields,
//! sort, query and context extensions).
//!
//! # Architecture
//!
//! ```text
//! HTTP request
//!     └── extractors (Endpoint, SearchQuery / SearchBody)
//!             └── PreHook ──► SearchEngine::search ──► PostHook
//!                     └── JSON FeatureCollection response
//! ```
//!
//! # Routes
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Landing page |
//! | `GET /conformance` | Conformance classes |
//! | `GET /api` | OpenAPI description |
//! | `GET|POST /search` | Item search |
//! | `GET /collections` | Collection listing |
//! | `GET /collections/{id}` | One collection |
//! | `GET|POST /collections/{id}/items` | Item search within a collection |
//! | `GET /collections/{id}/items/{itemId}` | One item |
//! | `GET /health` | Backend health |
//!
//! # Example
//!
//! ```rust,ignore
//! use satapi_rest::{ServerConfig, create_app_with_config};
//! use satapi_search::backends::memory::MemoryBackend;
//!
//! let backend = MemoryBackend::from_dir("./catalog")?;
//! let app = create_app_with_config(backend, ServerConfig::default());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod hooks;
pub mod routing;
pub mod state;

pub use config::{BackendMode, ServerConfig};
pub use error::{RestError, RestResult};
pub use hooks::{HookError, Hooks, PostHook, PreHook, RequestEnvelope};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use satapi_search::{CatalogProvider, SearchBackend, SearchEngine};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<B>(backend: B) -> Router
where
    B: SearchBackend + CatalogProvider + 'static,
{
    create_app_with_config(backend, ServerConfig::default())
}

/// Creates the Axum application with custom configuration and no hooks.
///
/// # Example
///
/// ```rust,ignore
/// use satapi_rest::{create_app_with_config, ServerConfig};
/// use satapi_search::backends::memory::MemoryBackend;
///
/// let config = ServerConfig {
///     port: 3000,
///     base_url: Some("https://stac.example.com".to_string()),
///     ..Default::default()
/// };
/// let app = create_app_with_config(MemoryBackend::new(), config);
/// ```
pub fn create_app_with_config<B>(backend: B, config: ServerConfig) -> Router
where
    B: SearchBackend + CatalogProvider + 'static,
{
    create_app_with_hooks(backend, config, Hooks::none())
}

/// Creates the Axum application with custom configuration and hooks.
///
/// The backend handle is created once here and shared by every request.
pub fn create_app_with_hooks<B>(backend: B, config: ServerConfig, hooks: Hooks) -> Router
where
    B: SearchBackend + CatalogProvider + 'static,
{
    info!(
        backend = backend.name(),
        hooks = ?hooks,
        "Creating STAC API server"
    );

    let engine = SearchEngine::new(Arc::new(backend), config.search_config());
    let state = AppState::new(engine, config.clone()).with_hooks(hooks);

    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to the search and
/// REST crates.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "satapi_search={level},satapi_rest={level},satapi={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
