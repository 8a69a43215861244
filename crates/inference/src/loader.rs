//! Backend loader for HTTP-served detectors.

use defectlab_core::detection::{BackendLoader, DetectionBackend, InferenceError, DEFAULT_BACKEND};

use crate::client::FasterRcnnClient;

/// Builds a fresh detector client per detection, sharing one connection
/// pool across all of them.
#[derive(Clone)]
pub struct HttpBackendLoader {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackendLoader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl BackendLoader for HttpBackendLoader {
    fn load(&self, backend: &str) -> Result<Box<dyn DetectionBackend>, InferenceError> {
        match backend {
            DEFAULT_BACKEND => Ok(Box::new(FasterRcnnClient::with_client(
                self.client.clone(),
                self.base_url.clone(),
            ))),
            other => Err(InferenceError::UnsupportedBackend(other.to_string())),
        }
    }
}
