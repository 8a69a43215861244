pub mod detection;
pub mod health;
pub mod models;
pub mod training;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /detect                 run detection on an uploaded image (POST)
/// /upload                 store an image for detection (POST, multipart)
///
/// /train                  start a simulated training task (POST)
/// /train/status           poll task progress (GET, ?taskId=)
/// /train/stop             stop a running task (POST, ?taskId=)
///
/// /models                 list promoted models (GET)
/// /models/{id}            one promoted model (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(detection::router())
        .nest("/train", training::router())
        .nest("/models", models::router())
}
