//! HTTP client for the faster-rcnn prediction endpoint.
//!
//! Wraps `POST {base_url}/predictions/faster-rcnn` using [`reqwest`]. The
//! endpoint receives a PNG body and answers with parallel arrays of boxes,
//! scores and labels.

use std::path::{Path, PathBuf};

use defectlab_core::detection::{DetectionBackend, InferenceError, RawDetection, DEFAULT_BACKEND};
use serde::Deserialize;

use crate::preprocess::prepare_image;

/// Raw prediction payload returned by the detector.
#[derive(Debug, Deserialize)]
pub struct PredictionResponse {
    pub boxes: Vec<[f32; 4]>,
    pub scores: Vec<f32>,
    pub labels: Vec<i64>,
}

impl PredictionResponse {
    /// Zip the parallel arrays into detections.
    pub fn into_detections(self) -> Result<Vec<RawDetection>, InferenceError> {
        if self.boxes.len() != self.scores.len() || self.boxes.len() != self.labels.len() {
            return Err(InferenceError::Malformed(format!(
                "length mismatch: {} boxes, {} scores, {} labels",
                self.boxes.len(),
                self.scores.len(),
                self.labels.len()
            )));
        }

        Ok(self
            .boxes
            .into_iter()
            .zip(self.scores)
            .zip(self.labels)
            .map(|((bbox, score), label)| RawDetection { bbox, score, label })
            .collect())
    }
}

/// HTTP client for the pretrained faster-rcnn detector.
pub struct FasterRcnnClient {
    client: reqwest::Client,
    base_url: String,
}

impl FasterRcnnClient {
    /// Create a new client.
    ///
    /// * `base_url` - Base HTTP URL of the prediction server, e.g.
    ///   `http://host:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (connection pooling across detections).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn predictions_url(&self) -> String {
        format!("{}/predictions/{DEFAULT_BACKEND}", self.base_url)
    }

    /// Send PNG bytes to the detector and parse the prediction.
    pub async fn predict_png(&self, png: Vec<u8>) -> Result<Vec<RawDetection>, InferenceError> {
        let response = self
            .client
            .post(self.predictions_url())
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(png)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(InferenceError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let prediction: PredictionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;

        prediction.into_detections()
    }
}

#[async_trait::async_trait]
impl DetectionBackend for FasterRcnnClient {
    async fn infer(&self, image: &Path) -> Result<Vec<RawDetection>, InferenceError> {
        let path: PathBuf = image.to_path_buf();
        let prepared = tokio::task::spawn_blocking(move || prepare_image(&path))
            .await
            .map_err(|e| InferenceError::Preprocess(e.to_string()))??;

        tracing::debug!(
            width = prepared.width,
            height = prepared.height,
            url = %self.predictions_url(),
            "Sending image to detector",
        );

        self.predict_png(prepared.png).await
    }
}
