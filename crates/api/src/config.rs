use std::path::PathBuf;

use defectlab_core::training::DEFAULT_STEP_MILLIS;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`). Detection calls
    /// block on the external detector, so this is generous.
    pub request_timeout_secs: u64,
    /// Directory holding uploaded images (default: `uploads`).
    pub uploads_dir: PathBuf,
    /// Base URL of the pretrained detector's prediction server.
    pub inference_url: String,
    /// Wall-clock milliseconds per simulated training progress point.
    pub training_step_millis: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    /// | `UPLOADS_DIR`          | `uploads`                  |
    /// | `INFERENCE_URL`        | `http://localhost:8080`    |
    /// | `TRAINING_STEP_MILLIS` | `500`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let uploads_dir =
            PathBuf::from(std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into()));

        let inference_url =
            std::env::var("INFERENCE_URL").unwrap_or_else(|_| "http://localhost:8080".into());

        let training_step_millis: u64 = std::env::var("TRAINING_STEP_MILLIS")
            .unwrap_or_else(|_| DEFAULT_STEP_MILLIS.to_string())
            .parse()
            .expect("TRAINING_STEP_MILLIS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            uploads_dir,
            inference_url,
            training_step_millis,
        }
    }
}
