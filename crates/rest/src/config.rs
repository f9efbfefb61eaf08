//! Server configuration for the STAC API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SATAPI_PORT` | 8080 | Server port |
//! | `SATAPI_HOST` | 127.0.0.1 | Host to bind |
//! | `SATAPI_LOG_LEVEL` | info | Log level |
//! | `SATAPI_BASE_URL` | (derived) | Public URL of the API |
//! | `SATAPI_CATALOG_ID` | sat-api | Root catalog id |
//! | `SATAPI_CATALOG_TITLE` | sat-api | Root catalog title |
//! | `SATAPI_CATALOG_DESCRIPTION` | A STAC API of public datasets | Root catalog description |
//! | `SATAPI_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `SATAPI_BACKEND_TIMEOUT` | 30 | Backend round-trip timeout (seconds) |
//! | `SATAPI_ENABLE_CORS` | true | Enable CORS |
//! | `SATAPI_CORS_ORIGINS` | * | Allowed origins |
//! | `SATAPI_CORS_METHODS` | GET,POST,OPTIONS | Allowed methods |
//! | `SATAPI_CORS_HEADERS` | Content-Type,Authorization,Accept | Allowed headers |
//! | `SATAPI_DEFAULT_LIMIT` | 10 | Page size when `limit` is absent |
//! | `SATAPI_MAX_LIMIT` | 10000 | Largest accepted `limit` |
//! | `SATAPI_BACKEND` | memory | `memory` or `elasticsearch` |
//! | `SATAPI_CATALOG_DIR` | (none) | Catalog directory loaded at start-up |
//! | `SATAPI_ES_NODES` | http://localhost:9200 | Elasticsearch nodes (comma-separated) |
//! | `SATAPI_ES_ITEMS_INDEX` | items | Items index |
//! | `SATAPI_ES_COLLECTIONS_INDEX` | collections | Collections index |
//! | `SATAPI_ES_USERNAME` / `SATAPI_ES_PASSWORD` | (none) | Basic auth |
//!
//! When `SATAPI_BASE_URL` is not set, links are built from the
//! `X-Forwarded-Proto`/`X-Forwarded-Host` headers, falling back to `Host`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use satapi_search::SearchConfig;

/// Which search backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendMode {
    /// Process-local index, optionally loaded from a catalog directory.
    #[default]
    Memory,
    /// Elasticsearch cluster.
    Elasticsearch,
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::Memory => write!(f, "memory"),
            BackendMode::Elasticsearch => write!(f, "elasticsearch"),
        }
    }
}

impl FromStr for BackendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendMode::Memory),
            "elasticsearch" | "es" => Ok(BackendMode::Elasticsearch),
            other => Err(format!(
                "unknown backend '{}', expected 'memory' or 'elasticsearch'",
                other
            )),
        }
    }
}

/// Server configuration for the STAC API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "satapi")]
#[command(about = "STAC API server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "SATAPI_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "SATAPI_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "SATAPI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Public URL of the API; derived from request headers when unset.
    #[arg(long, env = "SATAPI_BASE_URL")]
    pub base_url: Option<String>,

    /// Id of the root catalog.
    #[arg(long, env = "SATAPI_CATALOG_ID", default_value = "sat-api")]
    pub catalog_id: String,

    /// Title of the root catalog.
    #[arg(long, env = "SATAPI_CATALOG_TITLE", default_value = "sat-api")]
    pub catalog_title: String,

    /// Description of the root catalog.
    #[arg(
        long,
        env = "SATAPI_CATALOG_DESCRIPTION",
        default_value = "A STAC API of public datasets"
    )]
    pub catalog_description: String,

    /// Request timeout in seconds.
    #[arg(long, env = "SATAPI_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Backend round-trip timeout in seconds.
    #[arg(long, env = "SATAPI_BACKEND_TIMEOUT", default_value = "30")]
    pub backend_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "SATAPI_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "SATAPI_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(long, env = "SATAPI_CORS_METHODS", default_value = "GET,POST,OPTIONS")]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "SATAPI_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept"
    )]
    pub cors_headers: String,

    /// Page size when a request has no `limit`.
    #[arg(long, env = "SATAPI_DEFAULT_LIMIT", default_value = "10")]
    pub default_limit: usize,

    /// Largest accepted `limit`; larger values are clamped.
    #[arg(long, env = "SATAPI_MAX_LIMIT", default_value = "10000")]
    pub max_limit: usize,

    /// Search backend (memory, elasticsearch).
    #[arg(long, env = "SATAPI_BACKEND", default_value = "memory")]
    pub backend: BackendMode,

    /// Catalog directory loaded into the backend at start-up.
    #[arg(long, env = "SATAPI_CATALOG_DIR")]
    pub catalog_dir: Option<String>,

    /// Elasticsearch node URLs (comma-separated).
    #[arg(long, env = "SATAPI_ES_NODES", default_value = "http://localhost:9200")]
    pub elasticsearch_nodes: String,

    /// Elasticsearch items index.
    #[arg(long, env = "SATAPI_ES_ITEMS_INDEX", default_value = "items")]
    pub elasticsearch_items_index: String,

    /// Elasticsearch collections index.
    #[arg(long, env = "SATAPI_ES_COLLECTIONS_INDEX", default_value = "collections")]
    pub elasticsearch_collections_index: String,

    /// Elasticsearch basic auth username.
    #[arg(long, env = "SATAPI_ES_USERNAME")]
    pub elasticsearch_username: Option<String>,

    /// Elasticsearch basic auth password.
    #[arg(long, env = "SATAPI_ES_PASSWORD")]
    pub elasticsearch_password: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            base_url: None,
            catalog_id: "sat-api".to_string(),
            catalog_title: "sat-api".to_string(),
            catalog_description: "A STAC API of public datasets".to_string(),
            request_timeout: 30,
            backend_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept".to_string(),
            default_limit: 10,
            max_limit: 10_000,
            backend: BackendMode::Memory,
            catalog_dir: None,
            elasticsearch_nodes: "http://localhost:9200".to_string(),
            elasticsearch_items_index: "items".to_string(),
            elasticsearch_collections_index: "collections".to_string(),
            elasticsearch_username: None,
            elasticsearch_password: None,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the configured public URL without a trailing slash.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// The search engine settings carried by this configuration.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_default_limit(self.default_limit)
            .with_max_limit(self.max_limit)
            .with_backend_timeout(Duration::from_secs(self.backend_timeout))
    }

    /// Elasticsearch nodes as a list.
    pub fn elasticsearch_node_list(&self) -> Vec<String> {
        self.elasticsearch_nodes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if let Err(search_errors) = self.search_config().validate() {
            errors.extend(search_errors);
        }

        if self.catalog_id.trim().is_empty() {
            errors.push("Catalog id cannot be empty".to_string());
        }

        if let Some(base_url) = self.base_url() {
            if let Err(e) = url::Url::parse(base_url) {
                errors.push(format!("Invalid base URL '{}': {}", base_url, e));
            }
        }

        if self.backend == BackendMode::Elasticsearch {
            if self.elasticsearch_node_list().is_empty() {
                errors.push("At least one Elasticsearch node is required".to_string());
            }
            if self.elasticsearch_username.is_some() != self.elasticsearch_password.is_some() {
                errors.push(
                    "Elasticsearch username and password must be set together".to_string(),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0, a fixed base URL and disables features that
    /// might interfere with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            base_url: Some("http://localhost:8080".to_string()),
            request_timeout: 5,
            backend_timeout: 5,
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            max_limit: 100,
            ..Default::default()
        }
    }
}
