#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use defectlab_api::config::ServerConfig;
use defectlab_api::router::build_app_router;
use defectlab_api::state::AppState;
use defectlab_core::clock::ManualClock;
use defectlab_core::detection::{
    BackendLoader, DefectType, DetectionBackend, DetectionService, InferenceError, LabelClassifier,
    RawDetection,
};
use defectlab_core::registry::TrainingRegistry;
use defectlab_core::training::TimeBasedSchedule;

/// Detector stub returning a fixed set of detections.
pub struct StubBackend {
    detections: Vec<RawDetection>,
    fail: bool,
}

#[async_trait::async_trait]
impl DetectionBackend for StubBackend {
    async fn infer(&self, _image: &Path) -> Result<Vec<RawDetection>, InferenceError> {
        if self.fail {
            return Err(InferenceError::Request("detector unreachable".into()));
        }
        Ok(self.detections.clone())
    }
}

pub struct StubLoader {
    pub detections: Vec<RawDetection>,
    pub fail: bool,
}

impl BackendLoader for StubLoader {
    fn load(&self, _backend: &str) -> Result<Box<dyn DetectionBackend>, InferenceError> {
        Ok(Box::new(StubBackend {
            detections: self.detections.clone(),
            fail: self.fail,
        }))
    }
}

/// Always labels detections as scratches so responses are deterministic.
pub struct ScratchClassifier;

impl LabelClassifier for ScratchClassifier {
    fn classify(&self, _detection: &RawDetection) -> DefectType {
        DefectType::Scratch
    }
}

/// A running test application plus the handles tests need to drive it.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub registry: Arc<TrainingRegistry>,
    pub uploads: TempDir,
}

impl TestApp {
    /// Write a file into the uploads directory.
    pub fn put_upload(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.uploads.path().join(name), bytes).unwrap();
    }

    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance(chrono::Duration::seconds(secs));
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(uploads_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        uploads_dir: uploads_dir.to_path_buf(),
        inference_url: "http://127.0.0.1:9".to_string(),
        training_step_millis: 500,
    }
}

pub fn sample_detections() -> Vec<RawDetection> {
    vec![
        RawDetection {
            bbox: [12.0, 30.5, 52.9, 80.0],
            score: 0.92,
            label: 1,
        },
        RawDetection {
            bbox: [100.0, 100.0, 120.0, 140.0],
            score: 0.61,
            label: 3,
        },
        RawDetection {
            bbox: [0.0, 0.0, 5.0, 5.0],
            score: 0.2,
            label: 2,
        },
    ]
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(StubLoader {
        detections: sample_detections(),
        fail: false,
    })
}

/// Build the full application router with all middleware layers, a manual
/// clock and the given detector loader.
pub fn build_test_app_with(loader: StubLoader) -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let config = test_config(uploads.path());

    let clock = Arc::new(ManualClock::default());
    let registry = Arc::new(TrainingRegistry::new(
        Arc::new(TimeBasedSchedule::default()),
        clock.clone(),
    ));
    let detection = Arc::new(DetectionService::new(
        uploads.path(),
        Arc::new(loader),
        Arc::new(ScratchClassifier),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        registry: Arc::clone(&registry),
        detection,
    };

    TestApp {
        router: build_app_router(state, &config),
        clock,
        registry,
        uploads,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
