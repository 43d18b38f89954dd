//! Common test utilities for E2E testing.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by SQLite stores in a temporary directory, plus a small HTTP server
//! that publishes TLE text for the ingestion engine to fetch.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use satplan_core::{
    Config, DatabaseConfig, ElementRecordStore, HttpFetcher, IngestConfig, IngestionEngine,
    NewSatellite, NewSource, SatelliteCatalog, ServerConfig, SourceStore, SqliteRecordStore,
    SqliteSatelliteCatalog, SqliteSourceStore,
};

/// Re-export fixtures for test convenience
pub use satplan_core::testing::fixtures;

/// Fetch timeout used by the fixture's engine.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Clone)]
enum Published {
    Text { body: String, delay: Option<Duration> },
    Status(StatusCode),
}

type PublishedMap = Arc<Mutex<HashMap<String, Published>>>;

/// An in-process HTTP server publishing TLE text at configurable paths.
///
/// Unpublished paths answer 404.
pub struct SourceServer {
    base_url: String,
    published: PublishedMap,
    handle: JoinHandle<()>,
}

impl SourceServer {
    pub async fn start() -> Self {
        let published: PublishedMap = Arc::default();
        let app = Router::new()
            .route("/{*path}", get(serve_published))
            .with_state(Arc::clone(&published));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind source server");
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            published,
            handle,
        }
    }

    /// Full URL for `path` (without leading slash).
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub fn publish(&self, path: &str, body: &str) {
        self.insert(
            path,
            Published::Text {
                body: body.to_string(),
                delay: None,
            },
        );
    }

    /// Publish `body`, answering only after `delay`.
    pub fn publish_slow(&self, path: &str, body: &str, delay: Duration) {
        self.insert(
            path,
            Published::Text {
                body: body.to_string(),
                delay: Some(delay),
            },
        );
    }

    /// Answer `path` with an error status.
    pub fn fail(&self, path: &str, status: StatusCode) {
        self.insert(path, Published::Status(status));
    }

    fn insert(&self, path: &str, published: Published) {
        self.published
            .lock()
            .unwrap()
            .insert(path.to_string(), published);
    }
}

impl Drop for SourceServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_published(
    State(published): State<PublishedMap>,
    Path(path): Path<String>,
) -> Response {
    let entry = published.lock().unwrap().get(&path).cloned();
    match entry {
        Some(Published::Text { body, delay }) => {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            body.into_response()
        }
        Some(Published::Status(status)) => status.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Test fixture for E2E testing against real SQLite stores.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_auto_update() {
///     let fixture = TestFixture::new().await;
///     fixture.add_satellite("25544");
///     fixture.add_source("stations", "stations.txt");
///     fixture.source_server.publish("stations.txt", &fixtures::tle_text(&["25544"]));
///
///     let response = fixture.post_empty("/api/v1/tle/auto-update").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub sources: Arc<SqliteSourceStore>,
    pub catalog: Arc<SqliteSatelliteCatalog>,
    pub records: Arc<SqliteRecordStore>,
    /// Publishes TLE text for registered sources
    pub source_server: SourceServer,
    /// Temporary directory for the test database and static files
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let static_dir = temp_dir.path().join("static");
        std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
        std::fs::write(static_dir.join("index.html"), "<h1>satplan</h1>")
            .expect("Failed to write index.html");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                static_dir,
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            ingest: IngestConfig {
                fetch_timeout_secs: FETCH_TIMEOUT.as_secs(),
                run_on_startup: false,
                interval_minutes: None,
            },
            ..Default::default()
        };

        let sources =
            Arc::new(SqliteSourceStore::new(&db_path).expect("Failed to create source store"));
        let catalog = Arc::new(
            SqliteSatelliteCatalog::new(&db_path).expect("Failed to create satellite catalog"),
        );
        let records =
            Arc::new(SqliteRecordStore::new(&db_path).expect("Failed to create record store"));

        let fetcher = HttpFetcher::new(FETCH_TIMEOUT).expect("Failed to create fetcher");
        let engine = Arc::new(
            IngestionEngine::new(
                Arc::clone(&sources) as Arc<dyn SourceStore>,
                Arc::clone(&catalog) as Arc<dyn SatelliteCatalog>,
                Arc::clone(&records) as Arc<dyn ElementRecordStore>,
                Arc::new(fetcher),
            )
            .with_fetch_timeout(FETCH_TIMEOUT),
        );

        let state = Arc::new(satplan_server::state::AppState::new(
            config,
            engine,
            Arc::clone(&sources) as Arc<dyn SourceStore>,
            Arc::clone(&catalog) as Arc<dyn SatelliteCatalog>,
            Arc::clone(&records) as Arc<dyn ElementRecordStore>,
        ));
        let router = satplan_server::api::create_router(state);

        Self {
            router,
            sources,
            catalog,
            records,
            source_server: SourceServer::start().await,
            temp_dir,
        }
    }

    /// Put a satellite on the roster.
    pub fn add_satellite(&self, catalog_id: &str) {
        self.catalog
            .add(&NewSatellite {
                catalog_id: catalog_id.to_string(),
                name: format!("SAT-{}", catalog_id),
                hex_color: "#ffffff".to_string(),
            })
            .expect("Failed to add satellite");
    }

    /// Register a source pointing at `path` on the fixture's source server.
    pub fn add_source(&self, label: &str, path: &str) {
        self.sources
            .add(&NewSource {
                label: label.to_string(),
                url: self.source_server.url(path),
                description: String::new(),
            })
            .expect("Failed to add source");
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.json_response(request).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.json_response(request_builder.body(body).unwrap()).await
    }

    async fn json_response(&self, request: Request<Body>) -> TestResponse {
        let (status, body_bytes) = self.send(request).await;
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
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
        (status, body_bytes.to_vec())
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
