//! Similar-track recommendations via the Last.fm API
//!
//! Queries `track.getsimilar` for a seed query and formats the results as
//! display titles. A query of the form `"Track - Artist"` is split on the
//! first separator; anything else is treated as a bare track name. The seed
//! track itself is filtered out of the results case-insensitively.
//!
//! Lookup failures never surface to callers: transport errors, non-2xx
//! responses, decode errors, and responses missing the similar-tracks
//! envelope all degrade to a fixed fallback list. Only a well-formed
//! response whose track list is empty (or contains nothing but the seed)
//! yields an empty list.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const LASTFM_BASE_URL: &str = "http://ws.audioscrobbler.com/2.0/";
const SIMILAR_TRACKS_LIMIT: &str = "5";
const USER_AGENT: &str = "songscout/0.1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Served when the similar-tracks lookup fails outright.
pub const FALLBACK_RECOMMENDATIONS: [&str; 4] = [
    "Can't Feel My Face - The Weeknd",
    "Starboy - The Weeknd",
    "Save Your Tears - The Weeknd",
    "After Hours - The Weeknd",
];

/// Last.fm client errors
#[derive(Debug, Error)]
pub enum LastFmError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing expected field: {0}")]
    MissingField(&'static str),
}

/// `track.getsimilar` response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarTracksResponse {
    #[serde(default)]
    pub similartracks: Option<SimilarTracks>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarTracks {
    #[serde(default)]
    pub track: Option<Vec<SimilarTrack>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarTrack {
    pub name: String,
    pub artist: SimilarArtist,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarArtist {
    pub name: String,
}

/// Last.fm API client
pub struct LastFmClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LastFmClient {
    pub fn new(api_key: String) -> Result<Self, LastFmError> {
        Self::with_base_url(LASTFM_BASE_URL.to_string(), api_key)
    }

    /// Client for an explicit base URL, used by tests to point at a
    /// controlled endpoint.
    pub fn with_base_url(base_url: String, api_key: String) -> Result<Self, LastFmError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LastFmError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    /// Similar-track titles for a seed query, formatted as `"Name – Artist"`.
    ///
    /// Never fails: lookup errors are logged and replaced by
    /// [`FALLBACK_RECOMMENDATIONS`].
    pub async fn similar_tracks(&self, query: &str) -> Vec<String> {
        match self.fetch_similar(query).await {
            Ok(titles) => {
                tracing::info!(query = %query, count = titles.len(), "Similar tracks resolved");
                titles
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Similar-tracks lookup failed, serving fallback list");
                FALLBACK_RECOMMENDATIONS
                    .iter()
                    .map(|title| title.to_string())
                    .collect()
            }
        }
    }

    async fn fetch_similar(&self, query: &str) -> Result<Vec<String>, LastFmError> {
        let (track_name, artist_name) = split_query(query);

        let params = [
            ("method", "track.getsimilar"),
            ("track", track_name),
            ("artist", artist_name),
            ("api_key", self.api_key.as_str()),
            ("format", "json"),
            ("limit", SIMILAR_TRACKS_LIMIT),
        ];

        tracing::debug!(track = %track_name, artist = %artist_name, "Querying Last.fm similar tracks");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| LastFmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LastFmError::ApiError(status.as_u16(), body));
        }

        let data: SimilarTracksResponse = response
            .json()
            .await
            .map_err(|e| LastFmError::ParseError(e.to_string()))?;

        extract_recommendations(data, track_name)
    }
}

/// Split a `"Track - Artist"` query on the first separator; a query without
/// one is all track.
fn split_query(query: &str) -> (&str, &str) {
    match query.split_once(" - ") {
        Some((track, artist)) => (track, artist),
        None => (query, ""),
    }
}

/// Format and seed-filter the track list. A response without the
/// `similartracks.track` envelope (the shape of Last.fm error bodies) is a
/// failed lookup; a present-but-empty list is a legitimate empty result.
fn extract_recommendations(
    data: SimilarTracksResponse,
    track_name: &str,
) -> Result<Vec<String>, LastFmError> {
    let tracks = data
        .similartracks
        .and_then(|similar| similar.track)
        .ok_or(LastFmError::MissingField("similartracks.track"))?;

    let seed = track_name.to_lowercase();

    Ok(tracks
        .into_iter()
        .filter(|track| track.name.to_lowercase() != seed)
        .map(|track| format!("{} – {}", track.name, track.artist.name))
        .collect())
}
