#![allow(dead_code)]

//! Test helpers: build the router over in-memory stores and local storage.
//!
//! Run from workspace root: `cargo test -p castline-api`. No database or
//! network is needed; platform adapters and the OAuth refresher are stubs.

pub mod auth;
pub mod fixtures;
pub mod platforms;

use axum_test::{TestResponse, TestServer};
use castline_api::constants;
use castline_api::setup::{routes, services};
use castline_core::models::Platform;
use castline_core::{Config, PipelineConfig, StorageBackend};
use castline_db::InMemoryStore;
use castline_publishers::PublisherRegistry;
use castline_storage::create_storage;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

pub use platforms::{StubPublisher, StubRefresher};

/// Base URL baked into local signed URLs
pub const TEST_BASE_URL: &str = "http://localhost:3000";
pub const TEST_FEED_KEY: &str = "feed-renderer-key-for-integration-tests";
const TEST_SIGNING_SECRET: &str = "url-signing-secret-at-least-32-characters";

/// API path prefix for tests (e.g. `/api/v1/drafts`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, backing store, stubs and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub store: InMemoryStore,
    pub publishers: HashMap<Platform, Arc<StubPublisher>>,
    pub refresher: Arc<StubRefresher>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn publisher(&self, platform: Platform) -> &StubPublisher {
        &self.publishers[&platform]
    }

    /// PUT `data` to a signed write URL returned by the API
    pub async fn upload_to(&self, signed_url: &str, content_type: &str, data: &[u8]) -> TestResponse {
        let (path, query) = split_signed_url(signed_url);
        let mut request = self.server.put(&path).content_type(content_type);
        for (name, value) in query {
            request = request.add_query_param(&name, value);
        }
        request.bytes(bytes::Bytes::copy_from_slice(data)).await
    }

    /// GET a signed read URL returned by the API
    pub async fn download_from(&self, signed_url: &str) -> TestResponse {
        let (path, query) = split_signed_url(signed_url);
        let mut request = self.server.get(&path);
        for (name, value) in query {
            request = request.add_query_param(&name, value);
        }
        request.await
    }
}

/// Split a local signed URL into the router path and its query pairs
pub fn split_signed_url(signed_url: &str) -> (String, Vec<(String, String)>) {
    let relative = signed_url
        .strip_prefix(TEST_BASE_URL)
        .unwrap_or_else(|| panic!("unexpected signed URL base: {}", signed_url));
    let (path, query) = relative.split_once('?').expect("signed URL has a query");
    let pairs = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (path.to_string(), pairs)
}

pub fn test_config(temp_dir: &TempDir) -> Config {
    let mut config = PipelineConfig::default();
    config.base.jwt_secret = auth::TEST_JWT_SECRET.to_string();
    config.feed_service_key = Some(TEST_FEED_KEY.to_string());
    config.storage_backend = StorageBackend::Local;
    config.local_storage_path = Some(temp_dir.path().to_string_lossy().into_owned());
    config.local_storage_base_url = Some(TEST_BASE_URL.to_string());
    config.url_signing_secret = Some(TEST_SIGNING_SECRET.to_string());
    config.platform_timeout_secs = 5;
    config.broadcast_retry_backoff_ms = 10;
    Config(Box::new(config))
}

/// Setup test app with in-memory stores and local storage in a temp dir.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(&temp_dir);

    let storage = create_storage(&config)
        .await
        .expect("Failed to create local storage");

    let registry = PublisherRegistry::new();
    let mut publishers = HashMap::new();
    for platform in Platform::ALL {
        let publisher = Arc::new(StubPublisher::new(platform));
        registry.register(publisher.clone()).await;
        publishers.insert(platform, publisher);
    }

    let refresher = Arc::new(StubRefresher::default());
    let store = InMemoryStore::new();

    let state = services::build_state(
        &config,
        services::Stores::in_memory(store.clone()),
        storage,
        registry,
        refresher.clone(),
    );
    let app = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        store,
        publishers,
        refresher,
        _temp_dir: temp_dir,
    }
}
