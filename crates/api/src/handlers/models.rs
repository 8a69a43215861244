//! Handlers for the `/models` resource.
//!
//! Models are created only by training completion; this resource is
//! read-only.

use axum::extract::{Path, State};
use axum::Json;
use defectlab_core::error::CoreError;
use defectlab_core::registry::Model;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::SuccessResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelList {
    pub models: Vec<Model>,
}

#[derive(Debug, Serialize)]
pub struct ModelDetail {
    pub model: Model,
}

/// GET /api/models
///
/// List every model produced by a completed training task, oldest first.
pub async fn list_models(State(state): State<AppState>) -> Json<SuccessResponse<ModelList>> {
    let models = state.registry.list_models().await;
    Json(SuccessResponse::new(ModelList { models }))
}

/// GET /api/models/{id}
pub async fn get_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> AppResult<Json<SuccessResponse<ModelDetail>>> {
    let model = state
        .registry
        .get_model(&model_id)
        .await
        .ok_or(CoreError::NotFound {
            entity: "Model",
            id: model_id,
        })?;

    Ok(Json(SuccessResponse::new(ModelDetail { model })))
}
