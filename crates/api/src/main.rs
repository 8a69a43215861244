use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use defectlab_api::config::ServerConfig;
use defectlab_api::router::build_app_router;
use defectlab_api::state::AppState;
use defectlab_core::clock::SystemClock;
use defectlab_core::detection::{DetectionService, RandomLabelClassifier};
use defectlab_core::registry::TrainingRegistry;
use defectlab_core::training::TimeBasedSchedule;
use defectlab_inference::HttpBackendLoader;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "defectlab_api=debug,defectlab_core=debug,defectlab_inference=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Uploads directory ---
    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .expect("Failed to create uploads directory");
    tracing::info!(uploads_dir = %config.uploads_dir.display(), "Uploads directory ready");

    // --- Training registry ---
    let schedule = TimeBasedSchedule::new(Duration::from_millis(config.training_step_millis));
    let registry = Arc::new(TrainingRegistry::new(
        Arc::new(schedule),
        Arc::new(SystemClock),
    ));
    tracing::info!(step_ms = config.training_step_millis, "Training registry created");

    // --- Detection ---
    let detection = Arc::new(DetectionService::new(
        config.uploads_dir.clone(),
        Arc::new(HttpBackendLoader::new(config.inference_url.clone())),
        Arc::new(RandomLabelClassifier),
    ));
    tracing::info!(inference_url = %config.inference_url, "Detection service created");

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        registry: Arc::clone(&registry),
        detection,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!(
        tasks = registry.task_count().await,
        models = registry.model_count().await,
        "Graceful shutdown complete, in-memory registry discarded"
    );
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
