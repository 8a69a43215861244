//! Defect detection pipeline: upload path resolution, backend seam, score
//! filtering and defect labelling.
//!
//! The actual inference is delegated to a [`DetectionBackend`] (an external
//! pretrained object detector). Defect types are NOT derived from the
//! detector's native labels; a [`LabelClassifier`] assigns them, and the
//! default one picks uniformly at random from [`DefectType::ALL`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use crate::error::CoreError;

/// Score threshold used when the caller does not provide one.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Name of the only detection backend wired by default.
pub const DEFAULT_BACKEND: &str = "faster-rcnn";

/// Model id used when the caller does not provide one.
pub const DEFAULT_MODEL_ID: &str = "default";

// ---------------------------------------------------------------------------
// Defect catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectType {
    Scratch,
    Dent,
    Stain,
    Missing,
    Deformation,
}

impl DefectType {
    pub const ALL: [DefectType; 5] = [
        Self::Scratch,
        Self::Dent,
        Self::Stain,
        Self::Missing,
        Self::Deformation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Scratch => "scratch",
            Self::Dent => "dent",
            Self::Stain => "stain",
            Self::Missing => "missing",
            Self::Deformation => "deformation",
        }
    }

    /// Display colour used by the annotation UI.
    pub fn color(self) -> &'static str {
        match self {
            Self::Scratch => "#ef4444",
            Self::Dent => "#f97316",
            Self::Stain => "#eab308",
            Self::Missing => "#84cc16",
            Self::Deformation => "#06b6d4",
        }
    }
}

// ---------------------------------------------------------------------------
// Detection types
// ---------------------------------------------------------------------------

/// One raw detection as returned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Bounding box as `[x1, y1, x2, y2]` in pixels.
    pub bbox: [f32; 4],
    pub score: f32,
    /// Backend-native class label (unused for defect typing).
    pub label: i64,
}

/// A labelled defect returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedDefect {
    pub id: u32,
    #[serde(rename = "type")]
    pub defect_type: &'static str,
    pub confidence: f32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub color: &'static str,
}

/// Errors raised while running inference. Never leave [`DetectionService`].
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Unsupported detection backend: {0}")]
    UnsupportedBackend(String),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to preprocess image: {0}")]
    Preprocess(String),

    #[error("Inference request failed: {0}")]
    Request(String),

    #[error("Inference backend error ({status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Malformed inference response: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Strategy seams
// ---------------------------------------------------------------------------

/// An object detector able to run inference on an image file.
#[async_trait::async_trait]
pub trait DetectionBackend: Send + Sync {
    async fn infer(&self, image: &Path) -> Result<Vec<RawDetection>, InferenceError>;
}

/// Loads a detection backend by name. Called once per detection; loaders
/// must not cache backends across calls.
pub trait BackendLoader: Send + Sync {
    fn load(&self, backend: &str) -> Result<Box<dyn DetectionBackend>, InferenceError>;
}

/// Assigns a defect type to a raw detection.
pub trait LabelClassifier: Send + Sync {
    fn classify(&self, detection: &RawDetection) -> DefectType;
}

/// Placeholder classifier: uniform random choice over the catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomLabelClassifier;

impl LabelClassifier for RandomLabelClassifier {
    fn classify(&self, _detection: &RawDetection) -> DefectType {
        let idx = rand::rng().random_range(0..DefectType::ALL.len());
        DefectType::ALL[idx]
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Resolve a caller-supplied image path inside `uploads_dir`.
///
/// Only the final path component is kept, so `../../etc/passwd` resolves to
/// `uploads_dir/passwd`. Fails if no file name remains or the file does not
/// exist.
pub fn resolve_image_path(uploads_dir: &Path, image_path: &str) -> Result<PathBuf, CoreError> {
    let file_name = Path::new(image_path.trim())
        .file_name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| CoreError::InvalidImagePath(format!("'{image_path}' has no file name")))?;

    let resolved = uploads_dir.join(file_name);
    if !resolved.is_file() {
        return Err(CoreError::InvalidImagePath(format!(
            "'{}' does not exist in the uploads directory",
            file_name.to_string_lossy()
        )));
    }
    Ok(resolved)
}

/// Keep detections strictly above `threshold`, number them from 1 and label
/// them with `classifier`.
pub fn label_detections(
    raw: &[RawDetection],
    threshold: f64,
    classifier: &dyn LabelClassifier,
) -> Vec<DetectedDefect> {
    raw.iter()
        .filter(|d| f64::from(d.score) > threshold)
        .enumerate()
        .map(|(i, d)| {
            let defect_type = classifier.classify(d);
            let [x1, y1, x2, y2] = d.bbox;
            DetectedDefect {
                id: i as u32 + 1,
                defect_type: defect_type.name(),
                confidence: d.score,
                x: x1 as i32,
                y: y1 as i32,
                width: (x2 - x1) as i32,
                height: (y2 - y1) as i32,
                color: defect_type.color(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Runs detections against files in the uploads directory.
#[derive(Clone)]
pub struct DetectionService {
    uploads_dir: PathBuf,
    loader: Arc<dyn BackendLoader>,
    classifier: Arc<dyn LabelClassifier>,
}

impl DetectionService {
    pub fn new(
        uploads_dir: impl Into<PathBuf>,
        loader: Arc<dyn BackendLoader>,
        classifier: Arc<dyn LabelClassifier>,
    ) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            loader,
            classifier,
        }
    }

    /// See [`resolve_image_path`].
    pub fn resolve(&self, image_path: &str) -> Result<PathBuf, CoreError> {
        resolve_image_path(&self.uploads_dir, image_path)
    }

    /// Detect defects in an already-resolved image.
    ///
    /// Fail-soft: any backend or inference error is logged and yields an
    /// empty list.
    pub async fn detect(&self, image: &Path, model_id: &str, threshold: f64) -> Vec<DetectedDefect> {
        match self.try_detect(image, threshold).await {
            Ok(defects) => {
                tracing::debug!(
                    image = %image.display(),
                    model_id,
                    threshold,
                    detections = defects.len(),
                    "Detection finished",
                );
                defects
            }
            Err(e) => {
                tracing::warn!(
                    image = %image.display(),
                    model_id,
                    error = %e,
                    "Detection failed, returning no defects",
                );
                Vec::new()
            }
        }
    }

    async fn try_detect(
        &self,
        image: &Path,
        threshold: f64,
    ) -> Result<Vec<DetectedDefect>, InferenceError> {
        if !image.is_file() {
            return Err(InferenceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", image.display()),
            )));
        }

        // Model ids from training are synthetic; every detection runs on the
        // pretrained default backend.
        let backend = self.loader.load(DEFAULT_BACKEND)?;
        let raw = backend.infer(image).await?;
        Ok(label_detections(&raw, threshold, self.classifier.as_ref()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
