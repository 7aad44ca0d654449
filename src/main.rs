use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use hls_vod_server::app;
use hls_vod_server::config::settings::AppConfig;
use hls_vod_server::modules::transcode::encoder::FfmpegEncoder;
use hls_vod_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let config = AppConfig::new().context("invalid configuration")?;
    std::fs::create_dir_all(&config.raw_dir)
        .with_context(|| format!("cannot create {}", config.raw_dir.display()))?;
    std::fs::create_dir_all(&config.hls_dir)
        .with_context(|| format!("cannot create {}", config.hls_dir.display()))?;

    let port = config.server_port;
    let encoder = Arc::new(FfmpegEncoder::new(
        config.ffmpeg_bin.clone(),
        config.encode_timeout_secs,
    ));
    let state = AppState::new(config, encoder);

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("cannot bind port {port}"))?;
    info!("Server running on http://0.0.0.0:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
