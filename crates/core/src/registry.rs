//! In-memory task and model registry.
//!
//! A single [`TrainingRegistry`] owns both keyed maps behind one `RwLock`.
//! Every state transition (poll, stop, promotion) happens under the write
//! lock, so concurrent polls crossing 100% cannot promote a task twice.
//! Nothing is persisted; all state is lost when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::training::{
    Advance, ProgressSchedule, TaskSnapshot, TaskStatus, TimeBasedSchedule, TrainingParams,
    TrainingTask,
};
use crate::types::{EntityId, Timestamp};

/// Number of task-id characters embedded in a promoted model's name.
pub const MODEL_NAME_TASK_PREFIX_LEN: usize = 8;

/// A model produced by a completed training task. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: String,
    pub accuracy: f64,
    pub created_at: Timestamp,
    pub task_id: EntityId,
}

#[derive(Default)]
struct RegistryInner {
    tasks: HashMap<EntityId, TrainingTask>,
    models: IndexMap<EntityId, Model>,
}

/// Registry of simulated training tasks and the models they produce.
///
/// Designed to be wrapped in `Arc` and shared across request handlers.
pub struct TrainingRegistry {
    inner: RwLock<RegistryInner>,
    schedule: Arc<dyn ProgressSchedule>,
    clock: Arc<dyn Clock>,
}

impl TrainingRegistry {
    /// Create an empty registry with the given progress schedule and clock.
    pub fn new(schedule: Arc<dyn ProgressSchedule>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            schedule,
            clock,
        }
    }

    // -----------------------------------------------------------------------
    // Task registry
    // -----------------------------------------------------------------------

    /// Register a new running task and return its id.
    ///
    /// Returns immediately; no training work is performed.
    pub async fn start_task(&self, params: TrainingParams) -> Result<EntityId, CoreError> {
        params.validate()?;

        let task_id = uuid::Uuid::new_v4().to_string();
        let task = TrainingTask::new(task_id.clone(), params, self.clock.now());

        tracing::info!(
            task_id = %task_id,
            dataset_id = %task.params.dataset_id,
            model_type = %task.params.model_type,
            epochs = task.total_epochs,
            "Training task started",
        );

        self.inner.write().await.tasks.insert(task_id.clone(), task);
        Ok(task_id)
    }

    /// Recompute a task's progress from elapsed time and return a snapshot.
    ///
    /// The poll that first observes full progress marks the task completed
    /// and promotes it into a [`Model`]. Later polls return the stored
    /// snapshot unchanged.
    pub async fn poll_task(&self, task_id: &str) -> Result<TaskSnapshot, CoreError> {
        let now = self.clock.now();
        let mut inner = self.inner.write().await;
        let RegistryInner { tasks, models } = &mut *inner;

        let task = tasks.get_mut(task_id).ok_or_else(|| task_not_found(task_id))?;

        if task.advance(now, self.schedule.as_ref()) == Advance::Completed {
            let model = promote_task(models, task, now);
            tracing::info!(
                task_id = %task.id,
                model_id = %model.id,
                accuracy = model.accuracy,
                "Training task completed, model registered",
            );
        }

        Ok(task.snapshot())
    }

    /// Stop a running task, freezing its progress and metrics.
    ///
    /// Stopping an already stopped task is a no-op. Completed tasks cannot
    /// be stopped: their model already exists.
    pub async fn stop_task(&self, task_id: &str) -> Result<TaskSnapshot, CoreError> {
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| task_not_found(task_id))?;

        match task.status {
            TaskStatus::Running => {
                task.status = TaskStatus::Stopped;
                tracing::info!(task_id, progress = task.progress, "Training task stopped");
            }
            TaskStatus::Stopped => {}
            TaskStatus::Completed => {
                return Err(CoreError::Conflict(format!(
                    "Training task {task_id} has already completed"
                )));
            }
        }

        Ok(task.snapshot())
    }

    pub async fn task_count(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    // -----------------------------------------------------------------------
    // Model registry
    // -----------------------------------------------------------------------

    /// All promoted models, in promotion order.
    pub async fn list_models(&self) -> Vec<Model> {
        self.inner.read().await.models.values().cloned().collect()
    }

    pub async fn get_model(&self, model_id: &str) -> Option<Model> {
        self.inner.read().await.models.get(model_id).cloned()
    }

    pub async fn model_count(&self) -> usize {
        self.inner.read().await.models.len()
    }
}

impl Default for TrainingRegistry {
    fn default() -> Self {
        Self::new(Arc::new(TimeBasedSchedule::default()), Arc::new(SystemClock))
    }
}

/// Build the model for a just-completed task and insert it.
///
/// This is the only write path into the model map.
fn promote_task<'a>(
    models: &'a mut IndexMap<EntityId, Model>,
    task: &TrainingTask,
    now: Timestamp,
) -> &'a Model {
    let model_id = uuid::Uuid::new_v4().to_string();
    let short_task_id: String = task.id.chars().take(MODEL_NAME_TASK_PREFIX_LEN).collect();

    let model = Model {
        id: model_id.clone(),
        name: format!("{}_{}", task.params.model_type, short_task_id),
        model_type: task.params.model_type.clone(),
        accuracy: task.metrics.accuracy,
        created_at: now,
        task_id: task.id.clone(),
    };

    models.entry(model_id).or_insert(model)
}

fn task_not_found(task_id: &str) -> CoreError {
    CoreError::NotFound {
        entity: "TrainingTask",
        id: task_id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
