//! HTTP-level integration tests for the `/api/train` endpoints.
//!
//! Time is driven by the test app's manual clock, so progress values are
//! exact.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_empty, post_json, TestApp};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn train_body(epochs: u32) -> serde_json::Value {
    json!({
        "datasetId": "ds-42",
        "modelType": "faster-rcnn",
        "batchSize": 16,
        "epochs": epochs,
        "learningRate": 0.001,
        "splitRatio": 0.8,
        "augmentation": true,
    })
}

async fn start_task(app: &TestApp, epochs: u32) -> String {
    let response = post_json(app, "/api/train", train_body(epochs)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["taskId"].as_str().unwrap().to_string()
}

async fn status(app: &TestApp, task_id: &str) -> serde_json::Value {
    let response = get(app, &format!("/api/train/status?taskId={task_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Test: POST /api/train returns a task id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_training_returns_task_id() {
    let app = build_test_app();
    let response = post_json(&app, "/api/train", train_body(10)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Training task submitted");
    assert!(json["taskId"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(app.registry.task_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: missing required fields are rejected with 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_training_missing_field_returns_400() {
    let app = build_test_app();
    let mut body = train_body(10);
    body.as_object_mut().unwrap().remove("learningRate");

    let response = post_json(&app, "/api/train", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("learningRate"));
    assert_eq!(app.registry.task_count().await, 0);
}

#[tokio::test]
async fn start_training_without_augmentation_is_accepted() {
    let app = build_test_app();
    let mut body = train_body(10);
    body.as_object_mut().unwrap().remove("augmentation");

    let response = post_json(&app, "/api/train", body).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn start_training_invalid_value_returns_400() {
    let app = build_test_app();
    let mut body = train_body(10);
    body["splitRatio"] = json!(1.5);

    let response = post_json(&app, "/api/train", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("splitRatio"));
}

#[tokio::test]
async fn start_training_malformed_json_returns_400_envelope() {
    let app = build_test_app();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/train")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let response = common::send(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
}

// ---------------------------------------------------------------------------
// Test: full lifecycle over simulated time
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_follows_time_schedule_and_promotes_model() {
    let app = build_test_app();
    let task_id = start_task(&app, 10).await;

    let json = status(&app, &task_id).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["status"], "running");
    assert_eq!(json["progress"], 0);
    assert_eq!(json["currentEpoch"], 0);
    assert_eq!(json["totalEpochs"], 10);
    assert_eq!(json["metrics"]["loss"], 1.0);
    assert_eq!(json["remainingTime"], "50 min");

    app.advance_secs(5);
    let json = status(&app, &task_id).await;
    assert_eq!(json["progress"], 10);
    assert_eq!(json["currentEpoch"], 1);
    assert_eq!(json["remainingTime"], "45 min");

    app.advance_secs(45);
    let json = status(&app, &task_id).await;
    assert_eq!(json["status"], "completed");
    assert_eq!(json["progress"], 100);
    assert_eq!(json["currentEpoch"], 10);
    assert_eq!(json["metrics"]["accuracy"], 0.99);
    assert_eq!(json["remainingTime"], "0 min");

    let models = body_json(get(&app, "/api/models").await).await;
    let models = models["models"].as_array().unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["task_id"], task_id.as_str());
    assert_eq!(models[0]["type"], "faster-rcnn");
}

#[tokio::test]
async fn repeated_status_after_completion_creates_one_model() {
    let app = build_test_app();
    let task_id = start_task(&app, 5).await;
    app.advance_secs(120);

    for _ in 0..4 {
        let json = status(&app, &task_id).await;
        assert_eq!(json["status"], "completed");
        app.advance_secs(10);
    }

    assert_eq!(app.registry.model_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: status with unknown / missing task id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_unknown_task_returns_400() {
    let app = build_test_app();
    let response = get(&app, "/api/train/status?taskId=does-not-exist").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn status_missing_task_id_returns_400() {
    let app = build_test_app();
    let response = get(&app, "/api/train/status").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

// ---------------------------------------------------------------------------
// Test: stop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stop_freezes_running_task() {
    let app = build_test_app();
    let task_id = start_task(&app, 10).await;

    app.advance_secs(10);
    let before = status(&app, &task_id).await;
    assert_eq!(before["progress"], 20);

    let response = post_empty(&app, &format!("/api/train/stop?taskId={task_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Training task stopped");

    app.advance_secs(60);
    let after = status(&app, &task_id).await;
    assert_eq!(after["status"], "stopped");
    assert_eq!(after["progress"], 20);
    assert_eq!(after["metrics"], before["metrics"]);
    assert_eq!(app.registry.model_count().await, 0);
}

#[tokio::test]
async fn stop_unknown_task_returns_400() {
    let app = build_test_app();
    let response = post_empty(&app, "/api/train/stop?taskId=nope").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn stop_completed_task_returns_409() {
    let app = build_test_app();
    let task_id = start_task(&app, 10).await;
    app.advance_secs(50);
    status(&app, &task_id).await;

    let response = post_empty(&app, &format!("/api/train/stop?taskId={task_id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["success"], false);

    let json = status(&app, &task_id).await;
    assert_eq!(json["status"], "completed");
}
