//! songscout - music recognition and recommendation service
//!
//! HTTP service that identifies songs from uploaded audio or video URLs via
//! ACRCloud and suggests similar tracks via Last.fm.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songscout::config::AppConfig;
use songscout::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "songscout=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting songscout");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("Failed to load configuration")?;

    if config.lastfm_api_key.is_none() {
        tracing::warn!(
            "No Last.fm API key configured; similar-track lookups will serve the fallback list"
        );
    }

    let state = AppState::from_config(&config).context("Failed to initialize service clients")?;
    let app = songscout::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;
    info!("Listening on http://{}", config.bind);
    info!("Health check: http://{}/api/health", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
