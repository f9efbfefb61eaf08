//! Backend identity and capabilities.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::BackendError;

/// Identifies the type of search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Process-local index.
    Memory,
    /// Elasticsearch cluster.
    Elasticsearch,
    /// Custom or unknown backend.
    Custom(&'static str),
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Elasticsearch => write!(f, "elasticsearch"),
            BackendKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Query features a backend may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCapability {
    /// Equality and membership tests.
    TermFilter,
    /// Numeric and lexicographic ranges.
    RangeFilter,
    /// Prefix, suffix and substring matching.
    StringMatch,
    /// Bounding-box intersection.
    EnvelopeFilter,
    /// Arbitrary geometry intersection.
    GeometryFilter,
    /// Datetime instant and interval matching.
    TemporalFilter,
    /// Stable multi-key sorting.
    Sorting,
    /// `from`/`size` windows.
    OffsetPagination,
    /// Match counts are exact regardless of result size.
    ExactCounts,
}

impl std::fmt::Display for BackendCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BackendCapability::TermFilter => "term-filter",
            BackendCapability::RangeFilter => "range-filter",
            BackendCapability::StringMatch => "string-match",
            BackendCapability::EnvelopeFilter => "envelope-filter",
            BackendCapability::GeometryFilter => "geometry-filter",
            BackendCapability::TemporalFilter => "temporal-filter",
            BackendCapability::Sorting => "sorting",
            BackendCapability::OffsetPagination => "offset-pagination",
            BackendCapability::ExactCounts => "exact-counts",
        };
        write!(f, "{}", name)
    }
}

/// A search index the engine can talk to.
///
/// Implementations are created once at start-up and shared by every request,
/// so they must be safe for concurrent use.
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Returns the kind of backend.
    fn kind(&self) -> BackendKind;

    /// Returns a human-readable name for this backend.
    fn name(&self) -> &'static str;

    /// Returns all capabilities supported by this backend.
    fn capabilities(&self) -> Vec<BackendCapability>;

    /// Checks if this backend supports the given capability.
    fn supports(&self, capability: BackendCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Largest `offset + size` the backend can serve, if bounded.
    fn max_result_window(&self) -> Option<usize> {
        None
    }

    /// Checks if the backend is reachable and serving queries.
    async fn health_check(&self) -> Result<(), BackendError>;
}
