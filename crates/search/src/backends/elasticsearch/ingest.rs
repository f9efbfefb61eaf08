//! Document indexing for the Elasticsearch backend.

use elasticsearch::IndexParts;
use serde_json::Value;

use crate::backends::inherit_collection_properties;
use crate::core::CatalogProvider;
use crate::error::BackendError;

use super::backend::ElasticsearchBackend;

fn string_field<'a>(doc: &'a Value, name: &str) -> Result<&'a str, BackendError> {
    doc.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::MalformedResponse {
            backend_name: "elasticsearch".to_string(),
            message: format!("document is missing a string '{}'", name),
        })
}

/// Items are keyed by collection and id, as ids are only unique per collection.
pub(crate) fn item_document_id(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}

impl ElasticsearchBackend {
    /// Indexes or replaces a collection document.
    pub async fn index_collection(&self, collection: &Value) -> Result<(), BackendError> {
        let id = string_field(collection, "id")?;
        let index = self.config().collections_index.clone();
        self.put(&index, id, collection).await
    }

    /// Indexes or replaces an item.
    ///
    /// The item inherits its collection's `properties` the same way the
    /// memory backend does, so `query` filters on collection-level
    /// properties behave the same on both backends. Index the collection
    /// first.
    pub async fn index_item(&self, item: &Value) -> Result<(), BackendError> {
        let id = string_field(item, "id")?;
        let collection_id = string_field(item, "collection")?;

        let mut document = item.clone();
        if let Some(collection) = self.collection(collection_id).await? {
            inherit_collection_properties(&mut document, &collection);
        }

        let index = self.config().items_index.clone();
        self.put(&index, &item_document_id(collection_id, id), &document)
            .await
    }

    async fn put(&self, index: &str, doc_id: &str, document: &Value) -> Result<(), BackendError> {
        let response = self
            .client()
            .index(IndexParts::IndexId(index, doc_id))
            .body(document)
            .send()
            .await
            .map_err(|e| BackendError::Unavailable {
                backend_name: "elasticsearch".to_string(),
                message: format!("Failed to index document: {}", e),
            })?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Internal {
                backend_name: "elasticsearch".to_string(),
                message: format!(
                    "Failed to index {} into {} (status {}): {}",
                    doc_id, index, status, body
                ),
                source: None,
            });
        }

        tracing::debug!("Indexed '{}' into '{}'", doc_id, index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_document_id() {
        assert_eq!(
            item_document_id("landsat-8-l1", "LC80100102015082LGN00"),
            "landsat-8-l1/LC80100102015082LGN00"
        );
    }

    #[test]
    fn test_string_field_errors_name_the_field() {
        let err = string_field(&json!({"id": 3}), "id").unwrap_err();
        assert!(err.to_string().contains("'id'"));
        assert_eq!(string_field(&json!({"id": "x"}), "id").unwrap(), "x");
    }
}
