//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with a mock lookup source injected, so upload, listing and batch routes
//! can be exercised without a real explorer.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use enricher_core::{
    testing::MockLookupSource, BatchProcessor, ChainRegistry, Config, EnrichmentConfig,
    LookupSource, RecordStore, ServerConfig,
};
use enricher_server::state::AppState;

/// Re-export fixtures for test convenience
pub use enricher_core::testing::fixtures;

/// Multipart boundary used by [`TestFixture::upload`].
const BOUNDARY: &str = "----enricher-test-boundary";

/// Test fixture with a mock lookup source.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_upload() {
///     let fixture = TestFixture::new();
///     let response = fixture.upload("/api/v1/upload", "encode,origin_key\n0x1,base\n").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock lookup source - script explorer responses
    pub source: Arc<MockLookupSource>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default configuration.
    pub fn new() -> Self {
        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                cors_origins: vec![],
            },
            enrichment: EnrichmentConfig::default()
                .with_max_concurrent(4)
                .with_retry(2, 1),
            ..Default::default()
        };

        let source = Arc::new(MockLookupSource::new());
        let processor = BatchProcessor::new(
            config.enrichment.clone(),
            Arc::new(ChainRegistry::builtin()),
            Arc::clone(&source) as Arc<dyn LookupSource>,
        );
        let state = Arc::new(AppState::new(config, processor, RecordStore::new()));
        let router = enricher_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            source,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Upload `csv` as the multipart field `file`.
    pub async fn upload(&self, path: &str, csv: &str) -> TestResponse {
        self.upload_field(path, "file", csv).await
    }

    /// Upload `content` under an arbitrary multipart field name.
    pub async fn upload_field(&self, path: &str, field: &str, content: &str) -> TestResponse {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"contracts.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = field,
            c = content
        );
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }
}
