//! HTTP-level tests of the STAC API against the in-memory backend.
//!
//! Covers:
//! - landing page, conformance and API description
//! - collection listing and single collection/item reads
//! - GET and POST `/search`, including following `next` links
//! - collection-scoped item searches
//! - error statuses and bodies
//! - endpoint derivation from forwarded headers

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use common::fixtures::PATH_10_SCENES;
use common::harness::{BASE_URL, test_server, test_server_without_base_url};
use serde_json::{Value, json};

const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

fn feature_ids(body: &Value) -> Vec<String> {
    body["features"]
        .as_array()
        .map(|features| {
            features
                .iter()
                .filter_map(|f| f["id"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn link<'a>(body: &'a Value, rel: &str) -> Option<&'a Value> {
    body["links"]
        .as_array()?
        .iter()
        .find(|l| l["rel"] == rel)
}

// ============================================================================
// Catalog
// ============================================================================

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_landing_page() {
        let server = test_server();

        let response = server.get("/").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["type"], "Catalog");
        assert_eq!(body["stac_version"], "1.0.0");
        assert_eq!(body["id"], "sat-api");
        assert_eq!(body["conformsTo"].as_array().unwrap().len(), 13);

        // 7 navigation links plus one child per collection
        let links = body["links"].as_array().unwrap();
        assert_eq!(links.len(), 9);
        let children: Vec<_> = links
            .iter()
            .filter(|l| l["rel"] == "child")
            .filter_map(|l| l["href"].as_str())
            .collect();
        assert_eq!(
            children,
            vec![
                "http://localhost:8080/collections/landsat-8-l1",
                "http://localhost:8080/collections/sentinel-2-l1c",
            ]
        );

        let methods: Vec<_> = links
            .iter()
            .filter(|l| l["rel"] == "search")
            .filter_map(|l| l["method"].as_str())
            .collect();
        assert_eq!(methods, vec!["GET", "POST"]);
    }

    #[tokio::test]
    async fn test_conformance() {
        let server = test_server();

        let response = server.get("/conformance").await;

        response.assert_status_ok();
        let body: Value = response.json();
        let classes = body["conformsTo"].as_array().unwrap();
        assert_eq!(classes.len(), 13);
        assert!(classes.contains(&json!("https://api.stacspec.org/v1.0.0/item-search")));
    }

    #[tokio::test]
    async fn test_api_description() {
        let server = test_server();

        let response = server.get("/api").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["openapi"], "3.0.3");
        assert!(body["paths"]["/search"]["get"].is_object());
    }

    #[tokio::test]
    async fn test_health() {
        let server = test_server();

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "memory");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let server = test_server();

        let response = server.get("/does/not/exist").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["code"], "NotFound");
    }
}

// ============================================================================
// Collections and items
// ============================================================================

mod collections {
    use super::*;

    #[tokio::test]
    async fn test_list_collections() {
        let server = test_server();

        let response = server.get("/collections").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["collections"].as_array().unwrap().len(), 2);
        assert_eq!(body["context"]["returned"], 2);
        assert_eq!(
            link(&body, "self").unwrap()["href"],
            "http://localhost:8080/collections"
        );
    }

    #[tokio::test]
    async fn test_get_collection() {
        let server = test_server();

        let response = server.get("/collections/landsat-8-l1").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["id"], "landsat-8-l1");
        assert_eq!(
            link(&body, "items").unwrap()["href"],
            "http://localhost:8080/collections/landsat-8-l1/items"
        );
    }

    #[tokio::test]
    async fn test_missing_collection_is_404() {
        let server = test_server();

        let response = server.get("/collections/modis").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["code"], "NotFound");
        assert_eq!(body["description"], "Collection modis not found");
    }

    #[tokio::test]
    async fn test_get_item() {
        let server = test_server();

        let response = server
            .get("/collections/landsat-8-l1/items/LC80100102015082LGN00")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["type"], "Feature");
        assert_eq!(body["id"], "LC80100102015082LGN00");
        // Collection properties are merged into the item
        assert_eq!(body["properties"]["platform"], "landsat-8");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/geo+json"
        );
    }

    #[tokio::test]
    async fn test_item_in_wrong_collection_is_404() {
        let server = test_server();

        let response = server
            .get("/collections/sentinel-2-l1c/items/LC80100102015082LGN00")
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_scoped_search() {
        let server = test_server();

        let response = server.get("/collections/landsat-8-l1/items?limit=10").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["context"]["matched"], 4);
        assert_eq!(
            link(&body, "collection").unwrap()["href"],
            "http://localhost:8080/collections/landsat-8-l1"
        );
    }

    #[tokio::test]
    async fn test_scoped_post_search() {
        let server = test_server();

        let response = server
            .post("/collections/sentinel-2-l1c/items")
            .json(&json!({"limit": 5}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            feature_ids(&body),
            vec!["S2A_OPER_MSI_L1C_TL_SGS__20160312_T32TLR"]
        );
    }

    #[tokio::test]
    async fn test_scoped_search_unknown_collection() {
        let server = test_server();

        let response = server.get("/collections/modis/items").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}

// ============================================================================
// Search
// ============================================================================

mod search {
    use super::*;

    #[tokio::test]
    async fn test_get_search_default_page() {
        let server = test_server();

        let response = server.get("/search?limit=2").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["context"]["returned"], 2);
        assert_eq!(body["context"]["matched"], 5);
        assert_eq!(body["context"]["limit"], 2);
        assert_eq!(
            feature_ids(&body),
            vec!["LC80200352016112LGN00", "S2A_OPER_MSI_L1C_TL_SGS__20160312_T32TLR"]
        );

        let next = link(&body, "next").unwrap()["href"].as_str().unwrap();
        assert!(next.starts_with("http://localhost:8080/search?"));
        assert!(next.contains("page=2"));
    }

    #[tokio::test]
    async fn test_follow_post_next_link() {
        let server = test_server();

        let response = server
            .post("/search")
            .json(&json!({
                "query": {"landsat:wrs_path": {"in": ["10"]}},
                "limit": 2
            }))
            .await;

        response.assert_status_ok();
        let first: Value = response.json();
        assert_eq!(first["context"]["returned"], 2);
        assert_eq!(first["context"]["matched"], 3);

        let next = link(&first, "next").unwrap();
        assert_eq!(next["method"], "POST");
        let path = next["href"]
            .as_str()
            .unwrap()
            .strip_prefix(BASE_URL)
            .unwrap()
            .to_string();

        let response = server.post(&path).json(&next["body"]).await;

        response.assert_status_ok();
        let second: Value = response.json();
        assert_eq!(second["context"]["returned"], 1);
        assert!(link(&second, "next").is_none());

        let mut seen = feature_ids(&first);
        seen.extend(feature_ids(&second));
        seen.sort();
        assert_eq!(seen, PATH_10_SCENES.to_vec());
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let server = test_server();

        let response = server.get("/search?limit=1000").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["context"]["limit"], 100);
    }

    #[tokio::test]
    async fn test_invalid_limit_is_400() {
        let server = test_server();

        let response = server.get("/search?limit=0").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "BadRequest");
        assert_eq!(body["field"], "limit");
    }

    #[tokio::test]
    async fn test_invalid_bbox_is_400() {
        let server = test_server();

        let response = server.get("/search?bbox=1,2,3").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["field"], "bbox");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let server = test_server();

        let response = server.post("/search").text("{\"limit\": ").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["field"], "body");
    }

    #[tokio::test]
    async fn test_empty_post_body() {
        let server = test_server();

        let response = server.post("/search").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["context"]["matched"], 5);
    }

    #[tokio::test]
    async fn test_fields_shorthand_on_get() {
        let server = test_server();

        let response = server
            .get("/search?ids=LC80100102015082LGN00&fields=id,-geometry")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let feature = &body["features"][0];
        assert_eq!(feature["id"], "LC80100102015082LGN00");
        assert!(feature.get("geometry").is_none());
    }

    #[tokio::test]
    async fn test_bbox_and_datetime_on_get() {
        let server = test_server();

        let response = server
            .get("/search?bbox=-180,60,180,80&datetime=2015-03-01T00:00:00Z/2015-12-31T23:59:59Z")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(feature_ids(&body), vec!["LC80100102015082LGN00"]);
    }
}

// ============================================================================
// Endpoint derivation
// ============================================================================

mod endpoint {
    use super::*;

    #[tokio::test]
    async fn test_forwarded_headers() {
        let server = test_server_without_base_url();

        let response = server
            .get("/search?limit=1")
            .add_header(X_FORWARDED_HOST, HeaderValue::from_static("stac.example.com"))
            .add_header(X_FORWARDED_PROTO, HeaderValue::from_static("https"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            link(&body, "self").unwrap()["href"],
            "https://stac.example.com/search?limit=1"
        );
        assert_eq!(
            link(&body, "root").unwrap()["href"],
            "https://stac.example.com/"
        );
    }

    #[tokio::test]
    async fn test_host_header() {
        let server = test_server_without_base_url();

        let response = server
            .get("/collections")
            .add_header(header::HOST, HeaderValue::from_static("satapi.local:3000"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(
            link(&body, "self").unwrap()["href"],
            "http://satapi.local:3000/collections"
        );
    }

    #[tokio::test]
    async fn test_configured_base_url_wins() {
        let server = test_server();

        let response = server
            .get("/collections")
            .add_header(X_FORWARDED_HOST, HeaderValue::from_static("stac.example.com"))
            .await;

        let body: Value = response.json();
        assert_eq!(
            link(&body, "self").unwrap()["href"],
            "http://localhost:8080/collections"
        );
    }
}
