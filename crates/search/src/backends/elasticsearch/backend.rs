//! Elasticsearch backend implementation.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::Elasticsearch;
use elasticsearch::auth::Credentials;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Backend, BackendCapability, BackendKind};
use crate::error::BackendError;

/// Cluster credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ElasticsearchAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
}

/// Configuration for the Elasticsearch backend.
///
/// Index settings only apply when [`ensure_indices`](ElasticsearchBackend::ensure_indices)
/// creates the indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Elasticsearch node URLs (e.g., `["http://localhost:9200"]`).
    /// Currently uses the first node (single-node connection pool).
    pub nodes: Vec<String>,

    /// Index holding item documents (default: `"items"`).
    #[serde(default = "default_items_index")]
    pub items_index: String,

    /// Index holding collection documents (default: `"collections"`).
    #[serde(default = "default_collections_index")]
    pub collections_index: String,

    /// Number of primary shards per index (default: 1).
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,

    /// Number of replica shards per index (default: 1).
    #[serde(default = "default_replicas")]
    pub number_of_replicas: u32,

    /// Largest `offset + limit` a search page may reach (default: 10000).
    ///
    /// Written to `index.max_result_window` on index creation and reported
    /// through [`Backend::max_result_window`], so the engine rejects pages
    /// past it with a `page` validation error before querying.
    #[serde(default = "default_max_result_window")]
    pub max_result_window: u32,

    /// `context.matched` is exact up to this many hits and a lower bound
    /// beyond it (default: 10000).
    #[serde(default = "default_track_total_hits")]
    pub track_total_hits: u32,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticsearchAuth>,
}

fn default_items_index() -> String {
    "items".to_string()
}

fn default_collections_index() -> String {
    "collections".to_string()
}

fn default_shards() -> u32 {
    1
}

fn default_replicas() -> u32 {
    1
}

fn default_max_result_window() -> u32 {
    10000
}

fn default_track_total_hits() -> u32 {
    10000
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            items_index: default_items_index(),
            collections_index: default_collections_index(),
            number_of_shards: default_shards(),
            number_of_replicas: default_replicas(),
            max_result_window: default_max_result_window(),
            track_total_hits: default_track_total_hits(),
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
        }
    }
}

/// Elasticsearch backend for STAC item search.
pub struct ElasticsearchBackend {
    client: Elasticsearch,
    config: ElasticsearchConfig,
}

impl Debug for ElasticsearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ElasticsearchBackend {
    /// Creates a new Elasticsearch backend with the given configuration.
    ///
    /// No request is made; use [`health_check`](Backend::health_check) or
    /// [`ensure_indices`](Self::ensure_indices) to verify the cluster.
    pub fn new(config: ElasticsearchConfig) -> Result<Self, BackendError> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn build_client(config: &ElasticsearchConfig) -> Result<Elasticsearch, BackendError> {
        let url = config
            .nodes
            .first()
            .cloned()
            .unwrap_or_else(|| "http://localhost:9200".to_string());

        let parsed_url: elasticsearch::http::Url =
            url.parse().map_err(|e| BackendError::Unavailable {
                backend_name: "elasticsearch".to_string(),
                message: format!("Invalid URL: {}", e),
            })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if let Some(ElasticsearchAuth::Basic { username, password }) = &config.auth {
            builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
        }

        let transport = builder.build().map_err(|e| BackendError::Unavailable {
            backend_name: "elasticsearch".to_string(),
            message: format!("Failed to build transport: {}", e),
        })?;

        Ok(Elasticsearch::new(transport))
    }

    pub(crate) fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }
}

#[async_trait]
impl Backend for ElasticsearchBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Elasticsearch
    }

    fn name(&self) -> &'static str {
        "elasticsearch"
    }

    fn capabilities(&self) -> Vec<BackendCapability> {
        vec![
            BackendCapability::TermFilter,
            BackendCapability::RangeFilter,
            BackendCapability::StringMatch,
            BackendCapability::EnvelopeFilter,
            BackendCapability::GeometryFilter,
            BackendCapability::TemporalFilter,
            BackendCapability::Sorting,
            BackendCapability::OffsetPagination,
        ]
    }

    fn max_result_window(&self) -> Option<usize> {
        Some(self.config.max_result_window as usize)
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        let response = self
            .client
            .cluster()
            .health(elasticsearch::cluster::ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                backend_name: "elasticsearch".to_string(),
                message: format!("Health check failed: {}", e),
            })?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(BackendError::Unavailable {
                backend_name: "elasticsearch".to_string(),
                message: format!("Cluster health returned status {}", status),
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| BackendError::MalformedResponse {
                backend_name: "elasticsearch".to_string(),
                message: format!("Failed to parse health response: {}", e),
            })?;

        let cluster_status = body
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown");

        if cluster_status == "red" {
            return Err(BackendError::Unavailable {
                backend_name: "elasticsearch".to_string(),
                message: "Cluster status is red".to_string(),
            });
        }

        Ok(())
    }
}
