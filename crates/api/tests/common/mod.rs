//! Test harness: full router with the production middleware stack, backed by
//! a scripted recognition provider and a temp-dir image store.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use facia_api::config::ServerConfig;
use facia_api::state::AppState;
use facia_api::{handlers, router};
use facia_engine::{Engine, EngineConfig, LocalImageStore};
use facia_recognition::{
    IndexedTemplate, ProviderError, RecognitionProvider, RemoteFace, TemplateMatch,
};

type Scripted<T> = Mutex<VecDeque<Result<T, ProviderError>>>;

/// Scripted stand-in for the external recognition service.
#[derive(Default)]
pub struct StubProvider {
    detect_results: Scripted<Vec<RemoteFace>>,
    search_results: Scripted<Vec<TemplateMatch>>,
    index_results: Scripted<IndexedTemplate>,
    pub collection: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn push_detect(&self, result: Result<Vec<RemoteFace>, ProviderError>) {
        self.detect_results.lock().unwrap().push_back(result);
    }

    pub fn push_search(&self, result: Result<Vec<TemplateMatch>, ProviderError>) {
        self.search_results.lock().unwrap().push_back(result);
    }

    pub fn push_index(&self, result: Result<IndexedTemplate, ProviderError>) {
        self.index_results.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl RecognitionProvider for StubProvider {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<RemoteFace>, ProviderError> {
        self.detect_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted detect call")
    }

    async fn search(
        &self,
        _image: &[u8],
        _min_similarity: f64,
        _max_results: u32,
    ) -> Result<Vec<TemplateMatch>, ProviderError> {
        self.search_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted search call")
    }

    async fn index_face(
        &self,
        _image: &[u8],
        _external_id: &str,
    ) -> Result<IndexedTemplate, ProviderError> {
        let result = self
            .index_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted index call");
        if let Ok(indexed) = &result {
            self.collection
                .lock()
                .unwrap()
                .push(indexed.template_id.clone());
        }
        result
    }

    async fn delete_templates(
        &self,
        template_ids: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        let mut collection = self.collection.lock().unwrap();
        let mut deleted = Vec::new();
        for id in template_ids {
            if let Some(pos) = collection.iter().position(|c| c == id) {
                collection.remove(pos);
                deleted.push(id.clone());
            }
        }
        Ok(deleted)
    }

    async fn list_templates(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.collection.lock().unwrap().clone())
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_root: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage_root: storage_root.to_string(),
    }
}

pub struct TestApp {
    pub app: Router,
    pub provider: Arc<StubProvider>,
    _store_dir: TempDir,
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let store_dir = tempfile::tempdir().unwrap();
    let config = test_config(store_dir.path().to_str().unwrap());

    let provider = Arc::new(StubProvider::default());
    let store = Arc::new(LocalImageStore::new(store_dir.path()));
    let engine = Arc::new(Engine::new(
        pool.clone(),
        provider.clone(),
        store,
        EngineConfig::default(),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config),
        engine,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let app = Router::new()
        .merge(handlers::health::router())
        .nest("/api/v1", router::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    TestApp {
        app,
        provider,
        _store_dir: store_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a multipart body with one `image` field holding PNG bytes.
pub async fn post_image(app: Router, uri: &str, image: &[u8]) -> Response<Body> {
    let boundary = "test-boundary-7MA4YWxkTrZu0gW";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 180, 160]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
