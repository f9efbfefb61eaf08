//! SearchBackend and CatalogProvider implementations for the Elasticsearch
//! backend.

use async_trait::async_trait;
use elasticsearch::{GetParts, SearchParts};
use serde_json::{Value, json};

use crate::core::{CatalogProvider, SearchBackend};
use crate::error::BackendError;
use crate::types::{CompiledQuery, MatchCount, ResultPage, SortSpec, Window};

use super::backend::ElasticsearchBackend;
use super::query_builder::build_search_body;

/// Upper bound on collections returned by a listing.
const MAX_COLLECTIONS: usize = 1000;

fn internal_error(message: String) -> BackendError {
    BackendError::Internal {
        backend_name: "elasticsearch".to_string(),
        message,
        source: None,
    }
}

fn malformed(message: String) -> BackendError {
    BackendError::MalformedResponse {
        backend_name: "elasticsearch".to_string(),
        message,
    }
}

impl ElasticsearchBackend {
    /// Runs a `_search` request. A missing index reads as no hits.
    async fn run_search(&self, index: &str, body: Value) -> Result<Option<Value>, BackendError> {
        let response = self
            .client()
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                backend_name: "elasticsearch".to_string(),
                message: format!("Search request failed: {}", e),
            })?;

        if !response.status_code().is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains("index_not_found_exception") {
                tracing::debug!("Index '{}' does not exist", index);
                return Ok(None);
            }
            return Err(internal_error(format!("Search failed: {}", body)));
        }

        response
            .json::<Value>()
            .await
            .map(Some)
            .map_err(|e| malformed(format!("Failed to parse search response: {}", e)))
    }
}

/// Extracts `_source` documents and the match count from a search response.
fn parse_hits(body: &Value) -> Result<ResultPage, BackendError> {
    let hits = body
        .get("hits")
        .ok_or_else(|| malformed("search response has no 'hits'".to_string()))?;

    let items: Vec<Value> = hits
        .get("hits")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit.get("_source").cloned())
                .collect()
        })
        .unwrap_or_default();

    let total = hits.get("total");
    let value = total
        .and_then(|t| t.get("value"))
        .and_then(Value::as_u64)
        .unwrap_or(items.len() as u64);
    let matched = match total.and_then(|t| t.get("relation")).and_then(Value::as_str) {
        Some("gte") => MatchCount::lower_bound(value),
        _ => MatchCount::exact(value),
    };

    Ok(ResultPage::new(items, matched))
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn search(
        &self,
        query: &CompiledQuery,
        sort: &SortSpec,
        window: Window,
    ) -> Result<ResultPage, BackendError> {
        let body = build_search_body(query, sort, window, self.config().track_total_hits);
        tracing::debug!(index = %self.config().items_index, body = %body, "ES search");

        match self.run_search(&self.config().items_index, body).await? {
            Some(response) => parse_hits(&response),
            None => Ok(ResultPage::empty()),
        }
    }
}

#[async_trait]
impl CatalogProvider for ElasticsearchBackend {
    async fn collection(&self, id: &str) -> Result<Option<Value>, BackendError> {
        let index = &self.config().collections_index;
        let response = self
            .client()
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                backend_name: "elasticsearch".to_string(),
                message: format!("Get collection failed: {}", e),
            })?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(internal_error(format!(
                "Get collection {} failed (status {}): {}",
                id, status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| malformed(format!("Failed to parse get response: {}", e)))?;
        Ok(body.get("_source").cloned())
    }

    async fn collections(&self) -> Result<Vec<Value>, BackendError> {
        let body = json!({
            "query": { "match_all": {} },
            "sort": [{ "id": { "order": "asc", "unmapped_type": "keyword" } }],
            "size": MAX_COLLECTIONS
        });
        match self
            .run_search(&self.config().collections_index, body)
            .await?
        {
            Some(response) => Ok(parse_hits(&response)?.items),
            None => Ok(Vec::new()),
        }
    }

    async fn item(&self, collection: &str, id: &str) -> Result<Option<Value>, BackendError> {
        let body = json!({
            "query": { "bool": { "filter": [
                { "term": { "collection": collection } },
                { "term": { "id": id } }
            ] } },
            "size": 1
        });
        match self.run_search(&self.config().items_index, body).await? {
            Some(response) => Ok(parse_hits(&response)?.items.into_iter().next()),
            None => Ok(None),
        }
    }
}
