//! Route definitions for the `/train` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::training;
use crate::state::AppState;

/// Routes mounted at `/train`.
///
/// ```text
/// POST   /                -> start_training
/// GET    /status          -> training_status
/// POST   /stop            -> stop_training
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(training::start_training))
        .route("/status", get(training::training_status))
        .route("/stop", post(training::stop_training))
}
