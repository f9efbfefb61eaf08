//! Tests for the pre- and post-search hooks.

mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::harness::test_server_with;
use satapi_rest::{HookError, Hooks, PostHook, PreHook, RequestEnvelope, ServerConfig};
use serde_json::{Value, json};

/// Restricts every search to the sentinel collection.
struct SentinelOnly;

#[async_trait]
impl PreHook for SentinelOnly {
    async fn before_search(
        &self,
        mut request: RequestEnvelope,
    ) -> Result<RequestEnvelope, HookError> {
        request
            .raw
            .params
            .insert("collections".to_string(), json!(["sentinel-2-l1c"]));
        Ok(request)
    }
}

/// Marks every response.
struct Stamp;

#[async_trait]
impl PostHook for Stamp {
    async fn after_search(&self, mut response: Value) -> Result<Value, HookError> {
        response["stamped"] = json!(true);
        Ok(response)
    }
}

/// Always fails with a message that must not leak.
struct Broken;

#[async_trait]
impl PreHook for Broken {
    async fn before_search(&self, _request: RequestEnvelope) -> Result<RequestEnvelope, HookError> {
        Err(HookError::new("credentials for tenant 7 expired"))
    }
}

#[tokio::test]
async fn test_pre_hook_rewrites_get_search() {
    let server = test_server_with(
        ServerConfig::for_testing(),
        Hooks::none().with_pre(SentinelOnly),
    );

    let response = server.get("/search?limit=10").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["context"]["matched"], 1);
    assert_eq!(body["features"][0]["collection"], "sentinel-2-l1c");
}

#[tokio::test]
async fn test_post_hook_rewrites_response() {
    let server = test_server_with(ServerConfig::for_testing(), Hooks::none().with_post(Stamp));

    let response = server.post("/search").json(&json!({"limit": 1})).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["stamped"], true);
    assert_eq!(body["type"], "FeatureCollection");
}

#[tokio::test]
async fn test_hooks_only_wrap_searches() {
    let server = test_server_with(ServerConfig::for_testing(), Hooks::none().with_post(Stamp));

    let response = server.get("/collections").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.get("stamped").is_none());
}

#[tokio::test]
async fn test_failing_hook_is_generic_500() {
    let server = test_server_with(ServerConfig::for_testing(), Hooks::none().with_pre(Broken));

    let response = server.get("/search").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["description"], "Internal Server Error");
    assert!(!body.to_string().contains("tenant 7"));
}
