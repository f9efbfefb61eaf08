//! Health check endpoint handler.
//!
//! Provides a simple health check endpoint for monitoring and load balancers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use satapi_search::{CatalogProvider, SearchBackend};
use tracing::{debug, warn};

use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// Asks the backend whether it is serving queries.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - Backend is healthy
/// - `503 Service Unavailable` - Backend is unreachable or unhealthy
pub async fn health_handler<B>(State(state): State<AppState<B>>) -> Response
where
    B: SearchBackend + CatalogProvider + 'static,
{
    debug!("Processing health check request");

    let backend_name = state.backend_name();
    let (status, label) = match state.engine().health_check().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(e) => {
            warn!(backend = backend_name, error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    let body = serde_json::json!({
        "status": label,
        "backend": backend_name,
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (status, Json(body)).into_response()
}
