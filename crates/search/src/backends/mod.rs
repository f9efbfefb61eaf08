//! Search backend implementations.
//!
//! - [`memory`] - process-local index, always available
//! - `elasticsearch` - Elasticsearch index (feature `elasticsearch`)

pub mod memory;

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;

use serde_json::{Map, Value};

/// Copies a collection's `properties` into an item where the item does not
/// set them, so they can be filtered on like item properties.
pub fn inherit_collection_properties(item: &mut Value, collection: &Value) {
    let Some(shared) = collection.get("properties").and_then(Value::as_object) else {
        return;
    };
    let Some(item) = item.as_object_mut() else {
        return;
    };
    if let Value::Object(properties) = item
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()))
    {
        for (key, value) in shared {
            properties
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}
