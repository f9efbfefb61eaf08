//! Error types for the STAC API.
//!
//! Every error is rendered as a JSON body of the form
//! `{"code": "...", "description": "..."}`.
//!
//! # Error Mapping
//!
//! | Search Error | HTTP Status | Code |
//! |--------------|-------------|------|
//! | Validation | 400 | BadRequest |
//! | NotFound | 404 | NotFound |
//! | Backend | 502 | BadGateway |
//! | Backend (timeout) | 504 | GatewayTimeout |
//! | hook failure, anything else | 500 | InternalServerError |
//!
//! Backend and hook diagnostics never reach the response body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use satapi_search::{NotFoundError, SearchError, ValidationError};
use serde_json::json;
use std::fmt;

use crate::hooks::HookError;

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// A request parameter was invalid (HTTP 400).
    BadRequest {
        /// The offending parameter.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A collection, item or route does not exist (HTTP 404).
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    /// The search backend failed (HTTP 502).
    BadGateway {
        /// Public description of the failure.
        message: String,
    },

    /// The search backend timed out (HTTP 504).
    GatewayTimeout {
        /// Public description of the failure.
        message: String,
    },

    /// Anything else (HTTP 500). Carries no detail.
    Internal,
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequest { field, message } => {
                write!(f, "Invalid parameter '{}': {}", field, message)
            }
            RestError::NotFound { message } => write!(f, "{}", message),
            RestError::BadGateway { message } => write!(f, "{}", message),
            RestError::GatewayTimeout { message } => write!(f, "{}", message),
            RestError::Internal => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for RestError {}

impl RestError {
    /// The HTTP status this error is sent with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::NotFound { .. } => StatusCode::NOT_FOUND,
            RestError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            RestError::GatewayTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RestError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            RestError::BadRequest { .. } => "BadRequest",
            RestError::NotFound { .. } => "NotFound",
            RestError::BadGateway { .. } => "BadGateway",
            RestError::GatewayTimeout { .. } => "GatewayTimeout",
            RestError::Internal => "InternalServerError",
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "code": self.code(),
            "description": self.to_string(),
        });
        if let RestError::BadRequest { field, .. } = &self {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}

impl From<SearchError> for RestError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation(e) => e.into(),
            SearchError::NotFound(e) => e.into(),
            SearchError::Backend(e) if e.is_timeout() => RestError::GatewayTimeout {
                message: e.public_message().to_string(),
            },
            SearchError::Backend(e) => RestError::BadGateway {
                message: e.public_message().to_string(),
            },
        }
    }
}

impl From<ValidationError> for RestError {
    fn from(err: ValidationError) -> Self {
        RestError::BadRequest {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<NotFoundError> for RestError {
    fn from(err: NotFoundError) -> Self {
        let message = match err {
            NotFoundError::Collection { id } => format!("Collection {} not found", id),
            NotFoundError::Item { collection, id } => {
                format!("Item {} not found in collection {}", id, collection)
            }
        };
        RestError::NotFound { message }
    }
}

impl From<HookError> for RestError {
    fn from(err: HookError) -> Self {
        tracing::error!(error = %err, "Search hook failed");
        RestError::Internal
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;
