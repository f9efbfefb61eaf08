//! Error types for the search engine.
//!
//! Errors follow a small hierarchy: request-shape problems ([`ValidationError`]),
//! failures of the index behind the engine ([`BackendError`]) and lookups of
//! collections or items that do not exist ([`NotFoundError`]). Every stage
//! fails fast with one of these; nothing downstream of a failed stage runs.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The request could not be understood.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The search backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A scoped collection or item does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl SearchError {
    /// Returns `true` if the error was caused by the client's request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SearchError::Validation(_) | SearchError::NotFound(_))
    }
}

/// A malformed or unsupported request parameter.
///
/// Always names the offending top-level field so the transport can report
/// it back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid parameter '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for the given field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failures of the backend behind the engine.
///
/// The `message` fields carry diagnostic detail for logs. Callers outside the
/// engine only ever see [`BackendError::public_message`].
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// The backend did not answer within the request timeout.
    #[error("backend {backend_name} timed out after {timeout_ms}ms")]
    Timeout {
        backend_name: String,
        timeout_ms: u64,
    },

    /// The backend answered with something the engine could not interpret.
    #[error("malformed response from {backend_name}: {message}")]
    MalformedResponse {
        backend_name: String,
        message: String,
    },

    /// The compiled query uses a clause the backend cannot evaluate.
    #[error("capability '{capability}' not supported by {backend_name}")]
    UnsupportedCapability {
        backend_name: String,
        capability: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl BackendError {
    /// The generic description that is safe to show to API clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            BackendError::Timeout { .. } => "The search backend did not respond in time",
            _ => "The search backend failed to process the request",
        }
    }

    /// Returns `true` for timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Timeout { .. })
    }
}

/// A collection or item that does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("collection not found: {id}")]
    Collection { id: String },

    #[error("item not found: {collection}/{id}")]
    Item { collection: String, id: String },
}

/// Result type alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;
