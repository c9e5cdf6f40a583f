//! songscout library interface
//!
//! Exposes the application state and router construction for integration
//! testing.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::services::{AcrCloudClient, LastFmClient, YtDlpExtractor};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// ACRCloud identification client
    pub recognizer: Arc<AcrCloudClient>,
    /// Last.fm similar-tracks client
    pub recommender: Arc<LastFmClient>,
    /// yt-dlp audio extraction driver
    pub extractor: Arc<YtDlpExtractor>,
}

impl AppState {
    pub fn new(
        recognizer: AcrCloudClient,
        recommender: LastFmClient,
        extractor: YtDlpExtractor,
    ) -> Self {
        Self {
            recognizer: Arc::new(recognizer),
            recommender: Arc::new(recommender),
            extractor: Arc::new(extractor),
        }
    }

    /// Build all service clients from configuration.
    ///
    /// An absent Last.fm key yields a client whose lookups come back empty;
    /// the service still starts.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let recognizer = AcrCloudClient::new(
            &config.acr_host,
            config.acr_access_key.clone(),
            config.acr_access_secret.clone(),
        )?;
        let recommender =
            LastFmClient::new(config.lastfm_api_key.clone().unwrap_or_default())?;
        let extractor = YtDlpExtractor::new(config.ytdlp_path.clone());

        Ok(Self::new(recognizer, recommender, extractor))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::recognize_routes())
        .merge(api::recommend_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Open CORS for browser frontends
        .layer(CorsLayer::permissive())
}
