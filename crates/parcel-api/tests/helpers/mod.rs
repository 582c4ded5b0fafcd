//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p parcel-api`.

pub mod storage;

use axum_test::TestServer;
use parcel_api::setup::routes;
use parcel_api::AppState;
use parcel_core::Config;
use parcel_storage::Storage;
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration for tests, built without touching the process environment.
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("STORAGE_BACKEND".to_string(), "memory".to_string());
    vars.insert("S3_BUCKET".to_string(), "test-bucket".to_string());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("Invalid test config");
    config.validate().expect("Test config failed validation");
    config
}

/// Test server backed by the given storage.
pub fn test_server_with(config: &Config, storage: Arc<dyn Storage>) -> TestServer {
    let state = Arc::new(AppState::new(config, storage));
    let app = routes::setup_routes(config, state).expect("Failed to build routes");
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}

pub fn test_server(storage: Arc<dyn Storage>) -> TestServer {
    test_server_with(&test_config(&[]), storage)
}
