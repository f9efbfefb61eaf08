//! Index mappings for items and collections.

use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts};
use serde_json::{Value, json};

use crate::error::BackendError;

use super::backend::{ElasticsearchBackend, ElasticsearchConfig};

/// Mapping for the items index.
///
/// String properties are indexed as keywords so term, prefix and wildcard
/// queries see the raw value.
pub fn items_mapping(config: &ElasticsearchConfig) -> Value {
    json!({
        "settings": settings(config),
        "mappings": {
            "dynamic_templates": [
                {
                    "strings": {
                        "match_mapping_type": "string",
                        "mapping": { "type": "keyword" }
                    }
                }
            ],
            "properties": {
                "id": { "type": "keyword" },
                "collection": { "type": "keyword" },
                "geometry": { "type": "geo_shape" },
                "assets": { "type": "object", "enabled": false },
                "links": { "type": "object", "enabled": false },
                "properties": {
                    "type": "object",
                    "properties": {
                        "datetime": { "type": "date" },
                        "start_datetime": { "type": "date" },
                        "end_datetime": { "type": "date" },
                        "created": { "type": "date" },
                        "updated": { "type": "date" }
                    }
                }
            }
        }
    })
}

/// Mapping for the collections index.
pub fn collections_mapping(config: &ElasticsearchConfig) -> Value {
    json!({
        "settings": settings(config),
        "mappings": {
            "dynamic": false,
            "properties": {
                "id": { "type": "keyword" },
                "title": { "type": "text" }
            }
        }
    })
}

fn settings(config: &ElasticsearchConfig) -> Value {
    json!({
        "number_of_shards": config.number_of_shards,
        "number_of_replicas": config.number_of_replicas,
        "index.max_result_window": config.max_result_window
    })
}

/// Ensures an index exists, creating it with `mapping` if necessary.
pub async fn ensure_index(
    backend: &ElasticsearchBackend,
    index: &str,
    mapping: Value,
) -> Result<(), BackendError> {
    let exists_response = backend
        .client()
        .indices()
        .exists(IndicesExistsParts::Index(&[index]))
        .send()
        .await
        .map_err(|e| BackendError::Unavailable {
            backend_name: "elasticsearch".to_string(),
            message: format!("Failed to check index existence: {}", e),
        })?;

    if exists_response.status_code().is_success() {
        return Ok(());
    }

    let response = backend
        .client()
        .indices()
        .create(IndicesCreateParts::Index(index))
        .body(mapping)
        .send()
        .await
        .map_err(|e| BackendError::Unavailable {
            backend_name: "elasticsearch".to_string(),
            message: format!("Failed to create index {}: {}", index, e),
        })?;

    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // 400 with "resource_already_exists_exception" is OK (race condition)
        if body.contains("resource_already_exists_exception") {
            return Ok(());
        }
        return Err(BackendError::Internal {
            backend_name: "elasticsearch".to_string(),
            message: format!(
                "Failed to create index {} (status {}): {}",
                index, status, body
            ),
            source: None,
        });
    }

    tracing::info!("Created Elasticsearch index '{}'", index);
    Ok(())
}

impl ElasticsearchBackend {
    /// Creates the items and collections indices if they do not exist.
    pub async fn ensure_indices(&self) -> Result<(), BackendError> {
        let config = self.config();
        ensure_index(self, &config.collections_index, collections_mapping(config)).await?;
        ensure_index(self, &config.items_index, items_mapping(config)).await
    }
}
