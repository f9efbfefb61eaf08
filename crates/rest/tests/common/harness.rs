//! REST API test harness.
//!
//! Loads the fixture catalog from a temporary directory into a
//! `MemoryBackend` and serves the full router through `axum_test`.

use axum_test::TestServer;
use satapi_rest::{Hooks, ServerConfig, create_app_with_hooks};
use satapi_search::backends::memory::MemoryBackend;

use super::fixtures;

/// Public URL configured for tests.
pub const BASE_URL: &str = "http://localhost:8080";

/// Loads the fixture catalog the same way the server binary does.
pub fn seeded_backend() -> MemoryBackend {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fixtures::write_catalog(dir.path()).expect("Failed to write catalog");
    MemoryBackend::from_dir(dir.path()).expect("Failed to load catalog")
}

/// Creates a test server with the testing configuration and no hooks.
pub fn test_server() -> TestServer {
    test_server_with(ServerConfig::for_testing(), Hooks::none())
}

/// Creates a test server with a custom configuration and hooks.
pub fn test_server_with(config: ServerConfig, hooks: Hooks) -> TestServer {
    let app = create_app_with_hooks(seeded_backend(), config, hooks);
    TestServer::new(app).expect("Failed to create test server")
}

/// Creates a test server that derives links from request headers.
pub fn test_server_without_base_url() -> TestServer {
    let config = ServerConfig {
        base_url: None,
        ..ServerConfig::for_testing()
    };
    test_server_with(config, Hooks::none())
}
