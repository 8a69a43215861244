//! Handlers for the simulated training lifecycle (`/train`).
//!
//! Progress is advanced lazily: every status request recomputes the task
//! from elapsed time inside the registry.

use axum::extract::State;
use axum::Json;
use defectlab_core::training::{TaskStatus, TrainingMetrics, TrainingParams};
use defectlab_core::types::EntityId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::{MessageResponse, SuccessResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /api/train`. Every field except `augmentation` is required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTrainingRequest {
    pub dataset_id: Option<String>,
    pub model_type: Option<String>,
    pub batch_size: Option<u32>,
    pub epochs: Option<u32>,
    pub learning_rate: Option<f64>,
    pub split_ratio: Option<f64>,
    pub augmentation: Option<bool>,
}

impl StartTrainingRequest {
    /// Reject absent fields, then build the parameter snapshot.
    ///
    /// Value-level checks (positivity, ranges) happen in the registry.
    pub fn into_params(self) -> AppResult<TrainingParams> {
        let missing: Vec<&str> = [
            ("datasetId", self.dataset_id.is_none()),
            ("modelType", self.model_type.is_none()),
            ("batchSize", self.batch_size.is_none()),
            ("epochs", self.epochs.is_none()),
            ("learningRate", self.learning_rate.is_none()),
            ("splitRatio", self.split_ratio.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match self {
            Self {
                dataset_id: Some(dataset_id),
                model_type: Some(model_type),
                batch_size: Some(batch_size),
                epochs: Some(epochs),
                learning_rate: Some(learning_rate),
                split_ratio: Some(split_ratio),
                augmentation,
            } => Ok(TrainingParams {
                dataset_id,
                model_type,
                batch_size,
                epochs,
                learning_rate,
                split_ratio,
                augmentation: augmentation.unwrap_or(false),
            }),
            _ => Err(AppError::BadRequest(format!(
                "Missing required training parameters: {}",
                missing.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStarted {
    pub message: &'static str,
    pub task_id: EntityId,
}

/// `?taskId=` query used by status and stop.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIdParams {
    pub task_id: Option<String>,
}

impl TaskIdParams {
    fn require(self) -> AppResult<String> {
        self.task_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing taskId query parameter".into()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStatus {
    pub status: TaskStatus,
    pub progress: u8,
    pub current_epoch: u32,
    pub total_epochs: u32,
    pub metrics: TrainingMetrics,
    /// Human-readable estimate, e.g. `"45 min"`.
    pub remaining_time: String,
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

/// POST /api/train
///
/// Register a simulated training task and return its id immediately.
pub async fn start_training(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<StartTrainingRequest>,
) -> AppResult<Json<SuccessResponse<TrainingStarted>>> {
    let params = input.into_params()?;
    let task_id = state.registry.start_task(params).await?;

    Ok(Json(SuccessResponse::new(TrainingStarted {
        message: "Training task submitted",
        task_id,
    })))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/train/status?taskId=
///
/// Advance the task from elapsed time and report its progress. Returns 400
/// for a missing or unknown task id.
pub async fn training_status(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TaskIdParams>,
) -> AppResult<Json<SuccessResponse<TrainingStatus>>> {
    let task_id = params.require()?;
    let snapshot = state.registry.poll_task(&task_id).await?;

    tracing::debug!(
        task_id = %task_id,
        status = snapshot.status.as_str(),
        progress = snapshot.progress,
        "Training status polled",
    );

    Ok(Json(SuccessResponse::new(TrainingStatus {
        status: snapshot.status,
        progress: snapshot.progress,
        current_epoch: snapshot.current_epoch,
        total_epochs: snapshot.total_epochs,
        metrics: snapshot.metrics,
        remaining_time: format!("{} min", snapshot.remaining_minutes),
    })))
}

// ---------------------------------------------------------------------------
// Stop
// ---------------------------------------------------------------------------

/// POST /api/train/stop?taskId=
///
/// Stop a running task. Returns 400 for a missing or unknown task id and
/// 409 if the task has already completed.
pub async fn stop_training(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TaskIdParams>,
) -> AppResult<Json<MessageResponse>> {
    let task_id = params.require()?;
    state.registry.stop_task(&task_id).await?;

    Ok(Json(MessageResponse::ok("Training task stopped")))
}
