use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::backends::inherit_collection_properties;
use crate::core::{Backend, BackendCapability, BackendKind, CatalogProvider, SearchBackend};
use crate::error::BackendError;
use crate::types::{CompiledQuery, MatchCount, ResultPage, SortSpec, Window};

use super::eval;

#[derive(Debug, Default)]
struct Catalog {
    collections: BTreeMap<String, Value>,
    items: BTreeMap<(String, String), Value>,
}

/// A process-local catalog index.
///
/// Counts are always exact and every capability is supported.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    catalog: RwLock<Catalog>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a collection document.
    pub fn insert_collection(&self, collection: Value) -> Result<(), BackendError> {
        let id = string_field(&collection, "id")?;
        self.catalog.write().collections.insert(id, collection);
        Ok(())
    }

    /// Adds or replaces an item.
    ///
    /// Properties of the item's collection are copied into the item where
    /// the item does not set them, so they can be filtered on like any
    /// other property.
    pub fn insert_item(&self, mut item: Value) -> Result<(), BackendError> {
        let id = string_field(&item, "id")?;
        let collection_id = string_field(&item, "collection")?;

        let mut catalog = self.catalog.write();
        if let Some(collection) = catalog.collections.get(&collection_id) {
            inherit_collection_properties(&mut item, collection);
        }
        catalog.items.insert((collection_id, id), item);
        Ok(())
    }

    /// Every indexed item, in collection then id order.
    pub fn items(&self) -> Vec<Value> {
        self.catalog.read().items.values().cloned().collect()
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.catalog.read().items.len()
    }

    /// Number of collections.
    pub fn collection_count(&self) -> usize {
        self.catalog.read().collections.len()
    }

    /// Returns `true` if no items are indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn string_field(doc: &Value, name: &str) -> Result<String, BackendError> {
    doc.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BackendError::MalformedResponse {
            backend_name: "memory".to_string(),
            message: format!("document is missing a string '{}'", name),
        })
}

#[async_trait]
impl Backend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn name(&self) -> &'static str {
        "memory"
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
            BackendCapability::ExactCounts,
        ]
    }

    async fn health_check(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn search(
        &self,
        query: &CompiledQuery,
        sort: &SortSpec,
        window: Window,
    ) -> Result<ResultPage, BackendError> {
        let catalog = self.catalog.read();
        let mut hits: Vec<&Value> = catalog
            .items
            .values()
            .filter(|item| query.root().is_none_or(|clause| eval::matches(clause, item)))
            .collect();
        hits.sort_by(|a, b| eval::compare_items(a, b, sort));

        let matched = hits.len() as u64;
        let items: Vec<Value> = hits
            .into_iter()
            .skip(window.offset)
            .take(window.size)
            .cloned()
            .collect();
        debug!(matched, returned = items.len(), "Memory search");

        Ok(ResultPage::new(items, MatchCount::exact(matched)))
    }
}

#[async_trait]
impl CatalogProvider for MemoryBackend {
    async fn collection(&self, id: &str) -> Result<Option<Value>, BackendError> {
        Ok(self.catalog.read().collections.get(id).cloned())
    }

    async fn collections(&self) -> Result<Vec<Value>, BackendError> {
        Ok(self.catalog.read().collections.values().cloned().collect())
    }

    async fn item(&self, collection: &str, id: &str) -> Result<Option<Value>, BackendError> {
        Ok(self
            .catalog
            .read()
            .items
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }
}
