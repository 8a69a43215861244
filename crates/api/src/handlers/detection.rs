//! Handlers for defect detection and image upload.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use defectlab_core::detection::{DetectedDefect, DEFAULT_MODEL_ID, DEFAULT_THRESHOLD};
use defectlab_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::response::SuccessResponse;
use crate::state::AppState;

/// Image extensions accepted by the upload endpoint.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// URL prefix under which uploaded files are served.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub image_path: Option<String>,
    pub model_id: Option<String>,
    pub threshold: Option<ThresholdInput>,
}

/// `threshold` as clients send it: a JSON number, or a numeric string when a
/// form value is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ThresholdInput {
    Number(f64),
    Text(String),
}

impl ThresholdInput {
    /// Numeric threshold. A blank string means the default.
    pub fn value(&self) -> AppResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(text) if text.trim().is_empty() => Ok(DEFAULT_THRESHOLD),
            Self::Text(text) => text.trim().parse().map_err(|_| {
                AppError::BadRequest(format!("threshold must be a number, got '{text}'"))
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DetectionResult {
    pub defects: Vec<DetectedDefect>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub image_path: String,
}

// ---------------------------------------------------------------------------
// Detect
// ---------------------------------------------------------------------------

/// POST /api/detect
///
/// Run the detector on a previously uploaded image. Only the base file name
/// of `imagePath` is used. Inference failures yield an empty defect list
/// rather than an error.
pub async fn detect(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<DetectRequest>,
) -> AppResult<Json<SuccessResponse<DetectionResult>>> {
    let image_path = input
        .image_path
        .ok_or_else(|| CoreError::InvalidImagePath("imagePath is required".into()))?;
    let threshold = match &input.threshold {
        Some(threshold) => threshold.value()?,
        None => DEFAULT_THRESHOLD,
    };
    let model_id = input.model_id.unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

    let resolved = state.detection.resolve(&image_path)?;
    let defects = state.detection.detect(&resolved, &model_id, threshold).await;

    tracing::info!(
        image = %resolved.display(),
        model_id = %model_id,
        defects = defects.len(),
        "Detection request served",
    );

    Ok(Json(SuccessResponse::new(DetectionResult { defects })))
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// POST /api/upload
///
/// Accept a multipart form with a required `image` field, store it under a
/// fresh UUID name in the uploads directory and return the path to pass to
/// `/api/detect`.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<SuccessResponse<UploadResult>>> {
    let mut multipart = multipart?;
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.jpg").to_string();
        let data = field.bytes().await?;
        image = Some((filename, data.to_vec()));
    }

    let (filename, data) =
        image.ok_or_else(|| AppError::BadRequest("Missing required 'image' field".into()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded image is empty".into()));
    }

    let ext = image_extension(&filename);
    let stored_name = format!("{}.{ext}", uuid::Uuid::new_v4());
    let uploads_dir = &state.config.uploads_dir;

    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to create uploads dir: {e}")))?;
    tokio::fs::write(uploads_dir.join(&stored_name), &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    tracing::info!(file = %stored_name, bytes = data.len(), "Image uploaded");

    Ok(Json(SuccessResponse::new(UploadResult {
        image_path: format!("{UPLOADS_URL_PREFIX}/{stored_name}"),
    })))
}

/// Lower-cased extension of `filename` if supported, otherwise `jpg`.
fn image_extension(filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        ext
    } else {
        "jpg".to_string()
    }
}
