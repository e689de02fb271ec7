use anyhow::Context;
use dotenvy::dotenv;
use reframe::config::settings::AppConfig;
use reframe::infrastructure::media::FfmpegEngine;
use reframe::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reframe=info,tower_http=info")),
        )
        .init();

    info!("Starting server...");

    let mut config = AppConfig::new();
    tokio::fs::create_dir_all(&config.video_dir)
        .await
        .with_context(|| format!("Failed to create video directory {}", config.video_dir.display()))?;
    config.video_dir = tokio::fs::canonicalize(&config.video_dir).await?;
    info!(
        "Video directory {} (output naming: {}, response mode: {:?})",
        config.video_dir.display(),
        config.output_naming,
        config.response_mode
    );

    let engine = Arc::new(FfmpegEngine::from_config(&config));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let app = reframe::app::create_app(AppState::new(config, engine));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
