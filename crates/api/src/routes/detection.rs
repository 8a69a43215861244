//! Route definitions for detection and uploads.

use axum::routing::post;
use axum::Router;

use crate::handlers::detection;
use crate::state::AppState;

/// Routes merged at the `/api` root.
///
/// ```text
/// POST   /detect          -> detect
/// POST   /upload          -> upload_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/detect", post(detection::detect))
        .route("/upload", post(detection::upload_image))
}
