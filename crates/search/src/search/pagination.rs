//! Pagination controller.
//!
//! Computes the backend window for a request, performs the single backend
//! round-trip under a timeout, and derives the navigation links. Paging links
//! re-encode the whole canonical request in the transport the client used, so
//! following `next` reproduces every filter, including geometries.

use std::time::Duration;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::core::SearchBackend;
use crate::error::{BackendError, ValidationError};
use crate::types::response::GEOJSON;
use crate::types::{
    CompiledQuery, Link, MatchCount, RawSearchRequest, ResultPage, SearchRequest, SortSpec,
    Transport, Window,
};

/// Computes the window for the request's page.
///
/// Fails on `page` when the window would reach past what the backend can
/// serve, instead of letting the backend reject the query.
pub fn plan_window(
    request: &SearchRequest,
    max_result_window: Option<usize>,
) -> Result<Window, ValidationError> {
    let window = Window::for_page(request.page, request.limit);
    if let Some(max) = max_result_window
        && window.end() > max
    {
        return Err(ValidationError::new(
            "page",
            format!(
                "page {} with limit {} reaches past the maximum result window of {} records",
                request.page, request.limit, max
            ),
        ));
    }
    Ok(window)
}

/// Runs the query against the backend.
///
/// Unsatisfiable queries return an empty page without any I/O. The call is
/// not retried; a timeout surfaces as [`BackendError::Timeout`].
pub async fn fetch_page<B>(
    backend: &B,
    query: &CompiledQuery,
    sort: &SortSpec,
    window: Window,
    timeout: Duration,
) -> Result<ResultPage, BackendError>
where
    B: SearchBackend + ?Sized,
{
    if query.is_unsatisfiable() {
        debug!("Query cannot match anything; skipping backend");
        return Ok(ResultPage::empty());
    }

    for capability in query.required_capabilities() {
        if !backend.supports(capability) {
            return Err(BackendError::UnsupportedCapability {
                backend_name: backend.name().to_string(),
                capability: capability.to_string(),
            });
        }
    }

    match tokio::time::timeout(timeout, backend.search(query, sort, window)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                backend = backend.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Backend search timed out"
            );
            Err(BackendError::Timeout {
                backend_name: backend.name().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}

/// A `next` page exists iff records remain past this window.
pub fn has_next(window: Window, returned: usize, matched: MatchCount) -> bool {
    (window.offset.saturating_add(returned) as u64) < matched.value
}

/// The href items are searched at for this request.
pub fn search_href(base_url: &str, scope: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    match scope {
        Some(collection) => format!(
            "{}/collections/{}/items",
            base,
            urlencoding::encode(collection)
        ),
        None => format!("{}/search", base),
    }
}

/// Builds the `next`, `prev`, `self`, `root` and `collection` links.
pub fn page_links(
    base_url: &str,
    raw: &RawSearchRequest,
    request: &SearchRequest,
    window: Window,
    page: &ResultPage,
) -> Vec<Link> {
    let base = base_url.trim_end_matches('/');
    let href = search_href(base, request.scope.as_deref());
    let mut links = Vec::new();

    if has_next(window, page.returned(), page.matched) {
        links.push(paging_link("next", &href, request, request.page + 1));
    }
    if request.page > 1 {
        links.push(paging_link("prev", &href, request, request.page - 1));
    }

    links.push(self_link(&href, raw));
    links.push(Link::new("root", format!("{}/", base)).with_type(crate::types::response::JSON));

    if let Some(collection) = &request.scope {
        links.push(
            Link::new(
                "collection",
                format!("{}/collections/{}", base, urlencoding::encode(collection)),
            )
            .with_type(crate::types::response::JSON),
        );
    }

    links
}

/// The request exactly as received.
fn self_link(href: &str, raw: &RawSearchRequest) -> Link {
    match raw.transport {
        Transport::Get => {
            let href = match raw.raw_query.as_deref() {
                Some(query) => format!("{}?{}", href, query),
                None => href.to_string(),
            };
            Link::new("self", href).with_type(GEOJSON)
        }
        Transport::Post => Link::new("self", href)
            .with_type(GEOJSON)
            .with_post_body(raw.to_json()),
    }
}

fn paging_link(rel: &str, href: &str, request: &SearchRequest, page: usize) -> Link {
    match request.transport {
        Transport::Get => {
            let query = canonical_query_string(request, page);
            Link::new(rel, format!("{}?{}", href, query)).with_type(GEOJSON)
        }
        Transport::Post => Link::new(rel, href)
            .with_type(GEOJSON)
            .with_post_body(Value::Object(canonical_body(request, page))),
    }
}

/// The canonical request as a JSON body, with `page` replaced.
pub fn canonical_body(request: &SearchRequest, page: usize) -> Map<String, Value> {
    let mut body = Map::new();

    if let Some(collections) = &request.requested_collections {
        body.insert("collections".into(), json!(collections));
    }
    if let Some(ids) = &request.ids {
        body.insert("ids".into(), json!(ids));
    }
    if let Some(geometry) = &request.intersects {
        if let Ok(value) = serde_json::to_value(geometry) {
            body.insert("intersects".into(), value);
        }
    } else if let Some(bbox) = &request.bbox {
        body.insert("bbox".into(), json!(bbox.to_vec()));
    }
    if let Some(datetime) = &request.datetime {
        body.insert("datetime".into(), Value::String(datetime.raw.clone()));
    }
    if !request.query.is_empty() {
        body.insert("query".into(), json!(request.query));
    }
    if let Some(sort) = &request.sort {
        body.insert("sort".into(), json!(sort));
    }
    if let Some(fields) = &request.fields {
        body.insert("fields".into(), json!(fields));
    }
    body.insert("limit".into(), json!(request.limit));
    body.insert("page".into(), json!(page));

    body
}

/// The canonical request as a query string, with `page` replaced.
///
/// Lists are comma-joined; structured values are JSON-encoded.
pub fn canonical_query_string(request: &SearchRequest, page: usize) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());

    for (key, value) in canonical_body(request, page) {
        let encoded = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Array(items) if key != "sort" && items.iter().all(is_plain) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        };
        serializer.append_pair(&key, &encoded);
    }

    serializer.finish()
}

fn is_plain(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_))
}
