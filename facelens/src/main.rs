use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facelens::api::{create_router, AppState};
use facelens::config::Config;
use facelens::faces::{FaceComparator, FaceProvider};
use facelens::ocr::{OcrProvider, TextRecognizer};
use facelens::staging::StagingArea;

#[derive(Parser)]
#[command(name = "facelens")]
#[command(about = "Face comparison and text extraction over HTTP")]
struct Args {
    /// Bind host (overrides FACELENS_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides FACELENS_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Directory for uploads in flight (overrides STAGING_DIR)
    #[arg(long)]
    staging_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facelens=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.staging_dir {
        config.staging.dir = dir;
    }

    let staging = StagingArea::new(&config.staging.dir)?;
    tracing::info!("Staging uploads in {}", staging.dir().display());

    tracing::info!("Initializing OCR provider: {}...", config.ocr.model);
    let ocr = OcrProvider::new(&config.ocr)?;
    if !ocr.is_available() {
        tracing::warn!("OCR unavailable - /api/extract-text will fail until it is configured");
    }

    tracing::info!("Initializing face comparator: {}...", config.face.model);
    let faces = FaceProvider::new(&config.face)?;
    if !faces.is_available() {
        tracing::warn!("Face comparator unavailable - /api/compare-faces will fail until FACE_BASE_URL (or a local FACE_MODEL) is configured");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, staging, Arc::new(faces), Arc::new(ocr));
    let app = create_router(state);

    tracing::info!("Facelens starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}
