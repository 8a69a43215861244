use std::sync::Arc;

use defectlab_core::detection::DetectionService;
use defectlab_core::registry::TrainingRegistry;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// In-memory training task and model registry.
    pub registry: Arc<TrainingRegistry>,
    /// Detection pipeline over the uploads directory.
    pub detection: Arc<DetectionService>,
}
