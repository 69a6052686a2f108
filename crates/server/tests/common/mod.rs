//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock catalog and a manual clock injected, so the response cache can
//! be driven deterministically without network access.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use anitrack_core::{
    config::{AuthConfig, AuthMethod, CacheConfig, DatabaseConfig, ServerConfig},
    create_authenticator,
    testing::MockCatalog,
    CachedCatalog, Clock, Config, LibraryStore, ManualClock, SqliteLibraryStore,
};

/// Re-export fixtures for test convenience
pub use anitrack_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.catalog.add_all(fixtures::sample_records()).await;
///
///     let response = fixture.get("/api/v1/anime/search?q=bebop").await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock catalog - configure MyAnimeList responses
    pub catalog: MockCatalog,
    /// Clock driving cache expiry
    pub clock: Arc<ManualClock>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub auth_method: AuthMethod,
    pub cache: CacheConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            auth_method: AuthMethod::Token,
            cache: CacheConfig::default(),
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with the sample catalog loaded.
    pub async fn with_sample_catalog() -> Self {
        let fixture = Self::new().await;
        fixture.catalog.add_all(fixtures::sample_records()).await;
        fixture
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            auth: AuthConfig {
                method: test_config.auth_method,
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            cache: test_config.cache,
            catalog: None,
        };

        let library: Arc<dyn LibraryStore> = Arc::new(
            SqliteLibraryStore::new(&db_path).expect("Failed to create library store"),
        );
        let authenticator = Arc::from(create_authenticator(&config.auth, Arc::clone(&library)));

        let catalog = MockCatalog::new();
        let clock = Arc::new(ManualClock::new());
        let cached = Arc::new(CachedCatalog::with_clock(
            Arc::new(catalog.clone()),
            &config.cache,
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));

        let state = Arc::new(anitrack_server::state::AppState::new(
            config,
            authenticator,
            library,
            cached,
        ));

        let router = anitrack_server::api::create_router(state);

        Self {
            router,
            catalog,
            clock,
            temp_dir,
        }
    }

    /// Move the cache clock forward.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Register a user and return their access token.
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post(
                "/api/v1/users",
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["token"]
            .as_str()
            .expect("token missing from registration response")
            .to_string()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None, None).await
    }

    /// Send an authenticated GET request.
    pub async fn get_as(&self, token: &str, path: &str) -> TestResponse {
        self.request("GET", path, None, Some(token)).await
    }

    /// Send an authenticated POST request with JSON body.
    pub async fn post_as(&self, token: &str, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), Some(token)).await
    }

    /// Send an authenticated PUT request with JSON body.
    pub async fn put_as(&self, token: &str, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body), Some(token)).await
    }

    /// Send an authenticated DELETE request.
    pub async fn delete_as(&self, token: &str, path: &str) -> TestResponse {
        self.request("DELETE", path, None, Some(token)).await
    }

    /// Send a GET request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            request_builder = request_builder.header("Authorization", format!("Bearer {}", token));
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
