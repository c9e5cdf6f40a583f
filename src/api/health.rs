//! Service banner and health check endpoints

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// GET /api response
#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub message: String,
}

/// GET /api/health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// GET /api
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Music Recognition & Recommendation API".to_string(),
    })
}

/// GET /api/health
///
/// Liveness probe; carries no dependency checks.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "API is running".to_string(),
    })
}

/// Build banner and health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/api", get(banner))
        .route("/api/health", get(health_check))
}
