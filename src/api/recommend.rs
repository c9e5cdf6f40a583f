//! Recommendation API handler
//!
//! POST /api/recommend accepts either `{"song_title": ...}` or
//! `{"artist": ..., "track": ...}` and answers with similar-track titles.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/recommend request
///
/// All fields optional; the seed query is derived by precedence.
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub song_title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub track: Option<String>,
}

impl RecommendRequest {
    /// Seed query precedence: `song_title`, then `track` with `artist`
    /// joined as `"track - artist"`, then bare `track`. Empty strings count
    /// as absent. `None` means the request carries no usable seed.
    pub fn search_query(&self) -> Option<String> {
        let song_title = non_empty(&self.song_title);
        let artist = non_empty(&self.artist);
        let track = non_empty(&self.track);

        if let Some(title) = song_title {
            return Some(title.to_string());
        }
        if let (Some(track), Some(artist)) = (track, artist) {
            return Some(format!("{} - {}", track, artist));
        }
        track.map(|track| track.to_string())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// POST /api/recommend response
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    pub song: String,
    pub recommendations: Vec<String>,
    pub count: usize,
}

/// POST /api/recommend
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> ApiResult<Json<RecommendResponse>> {
    let query = request.search_query().ok_or_else(|| {
        ApiError::BadRequest("Either 'song_title' or 'track' is required".to_string())
    })?;

    let recommendations = state.recommender.similar_tracks(&query).await;
    let count = recommendations.len();

    Ok(Json(RecommendResponse {
        success: true,
        song: query,
        recommendations,
        count,
    }))
}

/// Build recommendation routes
pub fn recommend_routes() -> Router<AppState> {
    Router::new().route("/api/recommend", post(recommend))
}
