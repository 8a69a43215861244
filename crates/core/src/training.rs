//! Simulated training lifecycle: task records, progress schedule and the
//! synthetic metric curves.
//!
//! No real training happens. Progress is derived from elapsed wall-clock time
//! through a [`ProgressSchedule`], and every metric is a fixed linear function
//! of that progress. The registry (see [`crate::registry`]) owns the tasks and
//! calls [`TrainingTask::advance`] on each poll.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};
use crate::validation::{
    validate_non_empty, validate_open_unit_range, validate_positive_float, validate_positive_int,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Progress value at which a task is considered complete.
pub const PROGRESS_COMPLETE: u8 = 100;

/// Default wall-clock time per progress point (0.5 s).
pub const DEFAULT_STEP_MILLIS: u64 = 500;

/// Estimated minutes of training left per remaining progress point.
pub const MINUTES_PER_PROGRESS_POINT: f64 = 0.5;

pub const INITIAL_LOSS: f64 = 1.0;
pub const INITIAL_ACCURACY: f64 = 0.5;
pub const INITIAL_PRECISION: f64 = 0.6;
pub const INITIAL_RECALL: f64 = 0.55;

/// Floor for the loss curve.
pub const MIN_LOSS: f64 = 0.01;
/// Ceiling shared by accuracy, precision and recall.
pub const MAX_SCORE: f64 = 0.99;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Completed,
    Stopped,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Creation-time configuration of a training run. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub dataset_id: String,
    pub model_type: String,
    pub batch_size: u32,
    pub epochs: u32,
    pub learning_rate: f64,
    pub split_ratio: f64,
    pub augmentation: bool,
}

impl TrainingParams {
    /// Reject malformed parameters before any record is created.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_non_empty(&self.dataset_id, "datasetId")?;
        validate_non_empty(&self.model_type, "modelType")?;
        validate_positive_int(self.batch_size, "batchSize")?;
        validate_positive_int(self.epochs, "epochs")?;
        validate_positive_float(self.learning_rate, "learningRate")?;
        validate_open_unit_range(self.split_ratio, "splitRatio")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub loss: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
}

impl TrainingMetrics {
    /// Metrics of a freshly started task.
    pub const fn initial() -> Self {
        Self {
            loss: INITIAL_LOSS,
            accuracy: INITIAL_ACCURACY,
            precision: INITIAL_PRECISION,
            recall: INITIAL_RECALL,
        }
    }

    /// Synthetic metric curves as a function of progress (0-100).
    pub fn at_progress(progress: u8) -> Self {
        let p = f64::from(progress);
        Self {
            loss: (1.0 - p / 100.0).max(MIN_LOSS),
            accuracy: (0.5 + p / 200.0).min(MAX_SCORE),
            precision: (0.6 + p / 250.0).min(MAX_SCORE),
            recall: (0.55 + p / 220.0).min(MAX_SCORE),
        }
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::initial()
    }
}

// ---------------------------------------------------------------------------
// Progress schedule
// ---------------------------------------------------------------------------

/// Maps elapsed wall-clock time to a progress percentage.
///
/// Implementations must be monotonic in `elapsed` and never exceed
/// [`PROGRESS_COMPLETE`].
pub trait ProgressSchedule: Send + Sync {
    fn progress(&self, elapsed: Duration) -> u8;
}

/// One progress point per `step` of elapsed time, clamped at 100.
#[derive(Debug, Clone, Copy)]
pub struct TimeBasedSchedule {
    step: Duration,
}

impl TimeBasedSchedule {
    /// A zero step is treated as one millisecond.
    pub fn new(step: Duration) -> Self {
        Self {
            step: step.max(Duration::from_millis(1)),
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }
}

impl Default for TimeBasedSchedule {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_STEP_MILLIS))
    }
}

impl ProgressSchedule for TimeBasedSchedule {
    fn progress(&self, elapsed: Duration) -> u8 {
        let points = elapsed.as_nanos() / self.step.as_nanos();
        points.min(u128::from(PROGRESS_COMPLETE)) as u8
    }
}

/// Epoch reached at a given progress: `floor(progress * total / 100)`,
/// clamped to `total_epochs`.
pub fn epoch_at_progress(progress: u8, total_epochs: u32) -> u32 {
    let epoch = u64::from(progress) * u64::from(total_epochs) / u64::from(PROGRESS_COMPLETE);
    (epoch as u32).min(total_epochs)
}

/// Whole minutes of simulated training left at a given progress.
pub fn remaining_minutes(progress: u8) -> u32 {
    let left = PROGRESS_COMPLETE.saturating_sub(progress);
    (f64::from(left) * MINUTES_PER_PROGRESS_POINT).floor() as u32
}

// ---------------------------------------------------------------------------
// Task record
// ---------------------------------------------------------------------------

/// A simulated training run as stored in the registry.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingTask {
    pub id: EntityId,
    pub status: TaskStatus,
    pub start_time: Timestamp,
    pub total_epochs: u32,
    pub current_epoch: u32,
    pub progress: u8,
    pub metrics: TrainingMetrics,
    pub params: TrainingParams,
}

/// Outcome of advancing a task on poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Task was not running; nothing was recomputed.
    Unchanged,
    /// Progress, epoch and metrics were recomputed; still running.
    Progressed,
    /// This call moved the task from running to completed.
    Completed,
}

impl TrainingTask {
    /// Build a new running task with zeroed progress.
    pub fn new(id: EntityId, params: TrainingParams, start_time: Timestamp) -> Self {
        Self {
            id,
            status: TaskStatus::Running,
            start_time,
            total_epochs: params.epochs,
            current_epoch: 0,
            progress: 0,
            metrics: TrainingMetrics::initial(),
            params,
        }
    }

    /// Recompute derived state from the time elapsed since `start_time`.
    ///
    /// Only running tasks are recomputed. Returns [`Advance::Completed`]
    /// exactly once, on the call that first observes full progress.
    pub fn advance(&mut self, now: Timestamp, schedule: &dyn ProgressSchedule) -> Advance {
        if self.status.is_terminal() {
            return Advance::Unchanged;
        }

        let elapsed = (now - self.start_time).to_std().unwrap_or(Duration::ZERO);
        // Keep progress monotonic even if the clock steps backwards.
        let progress = schedule.progress(elapsed).max(self.progress);

        self.progress = progress;
        self.current_epoch = epoch_at_progress(progress, self.total_epochs);
        if progress > 0 {
            self.metrics = TrainingMetrics::at_progress(progress);
        }

        if progress >= PROGRESS_COMPLETE {
            self.status = TaskStatus::Completed;
            Advance::Completed
        } else {
            Advance::Progressed
        }
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            task_id: self.id.clone(),
            status: self.status,
            progress: self.progress,
            current_epoch: self.current_epoch,
            total_epochs: self.total_epochs,
            metrics: self.metrics,
            remaining_minutes: remaining_minutes(self.progress),
        }
    }
}

/// Point-in-time view of a task returned by polling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub task_id: EntityId,
    pub status: TaskStatus,
    pub progress: u8,
    pub current_epoch: u32,
    pub total_epochs: u32,
    pub metrics: TrainingMetrics,
    pub remaining_minutes: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
