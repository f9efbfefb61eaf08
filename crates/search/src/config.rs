//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Limits and timeouts applied by the [`SearchEngine`](crate::SearchEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Page size used when a request does not name a `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Requests asking for more than this are clamped.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Timeout for a single backend round-trip, in milliseconds.
    #[serde(default = "default_backend_timeout_ms")]
    pub backend_timeout_ms: u64,
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    10_000
}

fn default_backend_timeout_ms() -> u64 {
    30_000
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            backend_timeout_ms: default_backend_timeout_ms(),
        }
    }
}

impl SearchConfig {
    /// Sets the default page size.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Sets the maximum page size.
    pub fn with_max_limit(mut self, limit: usize) -> Self {
        self.max_limit = limit;
        self
    }

    /// Sets the backend timeout.
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Returns the backend timeout as a [`Duration`].
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }

    /// Validates the configuration, returning every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.default_limit == 0 {
            errors.push("default_limit must be greater than 0".to_string());
        }
        if self.max_limit == 0 {
            errors.push("max_limit must be greater than 0".to_string());
        }
        if self.default_limit > self.max_limit {
            errors.push("default_limit cannot exceed max_limit".to_string());
        }
        if self.backend_timeout_ms == 0 {
            errors.push("backend_timeout_ms must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
