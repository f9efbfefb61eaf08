//! Response assembly and document link decoration.

use serde_json::{Value, json};

use crate::types::response::{GEOJSON, JSON};
use crate::types::{Context, Link, MatchCount, ResponsePage, SearchRequest};

/// Packages projected features, paging metadata and links.
pub fn assemble(
    matched: MatchCount,
    features: Vec<Value>,
    request: &SearchRequest,
    links: Vec<Link>,
) -> ResponsePage {
    ResponsePage {
        kind: "FeatureCollection".to_string(),
        context: Context {
            page: request.page,
            limit: request.limit,
            matched: matched.value,
            returned: features.len(),
        },
        features,
        links,
    }
}

/// Adds `self`, `parent`, `collection` and `root` links to an item that
/// does not carry them already.
pub fn decorate_item(item: &mut Value, base_url: &str) {
    let base = base_url.trim_end_matches('/');
    let (Some(id), Some(collection)) = (
        item.get("id").and_then(Value::as_str).map(str::to_string),
        item.get("collection")
            .and_then(Value::as_str)
            .map(str::to_string),
    ) else {
        return;
    };

    let collection_href = format!("{}/collections/{}", base, urlencoding::encode(&collection));
    let links = [
        Link::new(
            "self",
            format!("{}/items/{}", collection_href, urlencoding::encode(&id)),
        )
        .with_type(GEOJSON),
        Link::new("parent", collection_href.clone()).with_type(JSON),
        Link::new("collection", collection_href).with_type(JSON),
        Link::new("root", format!("{}/", base)).with_type(JSON),
    ];
    add_missing_links(item, links);
}

/// Adds `self`, `root` and `items` links to a collection document.
pub fn decorate_collection(collection: &mut Value, base_url: &str) {
    let base = base_url.trim_end_matches('/');
    let Some(id) = collection
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        return;
    };

    let href = format!("{}/collections/{}", base, urlencoding::encode(&id));
    let links = [
        Link::new("self", href.clone()).with_type(JSON),
        Link::new("root", format!("{}/", base)).with_type(JSON),
        Link::new("parent", format!("{}/", base)).with_type(JSON),
        Link::new("items", format!("{}/items", href)).with_type(GEOJSON),
    ];
    add_missing_links(collection, links);
}

fn add_missing_links<const N: usize>(document: &mut Value, links: [Link; N]) {
    let Value::Object(map) = document else {
        return;
    };

    let entry = map.entry("links").or_insert_with(|| json!([]));
    if !entry.is_array() {
        *entry = json!([]);
    }
    let Value::Array(existing) = entry else {
        return;
    };

    for link in links {
        let present = existing
            .iter()
            .any(|l| l.get("rel").and_then(Value::as_str) == Some(link.rel.as_str()));
        if !present {
            existing.push(link.to_json());
        }
    }
}
