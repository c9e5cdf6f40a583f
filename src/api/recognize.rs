//! Recognition API handlers
//!
//! POST /api/recognize accepts a multipart audio upload; POST
//! /api/recognize-youtube accepts a video URL and extracts the audio first.
//! Both resolve the audio to a scoped local file, submit it to the
//! recognition client, and answer with the uniform success/no-match
//! envelope. Recognition service failures are folded into the no-match
//! answer; only bad client input and local faults surface as errors.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ApiError, ApiResult};
use crate::models::SongIdentification;
use crate::services::acrcloud::AcrCloudError;
use crate::services::audio_source::{self, AudioSourceError};
use crate::AppState;

/// Upload cap for the multipart recognition endpoint.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Recognition response envelope, shared by both endpoints
#[derive(Debug, Serialize)]
pub struct RecognitionResponse {
    pub success: bool,
    pub song: Option<SongIdentification>,
    pub message: String,
    /// Present only on successful URL-sourced recognitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RecognitionResponse {
    fn from_match(song: Option<SongIdentification>) -> Self {
        match song {
            Some(song) => Self {
                success: true,
                song: Some(song),
                message: "Song recognized successfully".to_string(),
                source: None,
            },
            None => Self {
                success: false,
                song: None,
                message: "Could not recognize the song".to_string(),
                source: None,
            },
        }
    }

    fn from_youtube_match(song: Option<SongIdentification>) -> Self {
        match song {
            Some(song) => Self {
                success: true,
                song: Some(song),
                message: "Song recognized successfully from YouTube".to_string(),
                source: Some("youtube".to_string()),
            },
            None => Self {
                success: false,
                song: None,
                message: "Could not recognize the song from YouTube video".to_string(),
                source: None,
            },
        }
    }
}

/// POST /api/recognize-youtube request
#[derive(Debug, Deserialize)]
pub struct YoutubeRecognizeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// POST /api/recognize
///
/// Recognize a song from an uploaded audio file.
pub async fn recognize_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<RecognitionResponse>> {
    let payload = read_audio_upload(&mut multipart).await?;

    let staged = audio_source::stage_upload(&payload)
        .map_err(|e| ApiError::Internal(format!("Recognition failed: {}", e)))?;

    let song = recognize_at(&state, staged.path())
        .await
        .map_err(|e| ApiError::Internal(format!("Recognition failed: {}", e)))?;

    Ok(Json(RecognitionResponse::from_match(song)))
}

/// POST /api/recognize-youtube
///
/// Recognize a song from a video URL by extracting its audio stream.
pub async fn recognize_youtube(
    State(state): State<AppState>,
    Json(request): Json<YoutubeRecognizeRequest>,
) -> ApiResult<Json<RecognitionResponse>> {
    let url = match request.url.as_deref() {
        Some(url) if !url.is_empty() => url,
        _ => return Err(ApiError::BadRequest("YouTube URL is required".to_string())),
    };

    let extracted = state
        .extractor
        .extract_audio(url)
        .await
        .map_err(map_extraction_error)?;

    let song = recognize_at(&state, extracted.path())
        .await
        .map_err(|e| ApiError::Internal(format!("YouTube recognition failed: {}", e)))?;

    Ok(Json(RecognitionResponse::from_youtube_match(song)))
}

/// Build recognition routes
pub fn recognize_routes() -> Router<AppState> {
    Router::new()
        .route("/api/recognize", post(recognize_upload))
        .route("/api/recognize-youtube", post(recognize_youtube))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Pull the `file` part out of the multipart body, checking its declared
/// media type.
async fn read_audio_upload(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("");
        if !content_type.starts_with("audio/") {
            return Err(ApiError::BadRequest(
                "File must be an audio file".to_string(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?;

        return Ok(data.to_vec());
    }

    Err(ApiError::BadRequest("Audio file is required".to_string()))
}

/// Run recognition on a staged file. Service-side failures (transport,
/// non-2xx, malformed payload) fold into the no-match answer; local faults
/// propagate.
async fn recognize_at(
    state: &AppState,
    path: &Path,
) -> Result<Option<SongIdentification>, AcrCloudError> {
    match state.recognizer.recognize_file(path).await {
        Ok(song) => Ok(song),
        Err(e @ (AcrCloudError::Io(_) | AcrCloudError::SigningError(_))) => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "Recognition service failure");
            Ok(None)
        }
    }
}

fn map_extraction_error(err: AudioSourceError) -> ApiError {
    match err {
        AudioSourceError::InvalidSource(_)
        | AudioSourceError::ExtractionFailed(_)
        | AudioSourceError::ExtractionEmpty => ApiError::BadRequest(err.to_string()),
        AudioSourceError::ToolUnavailable(_) | AudioSourceError::Io(_) => {
            ApiError::Internal(format!("Audio extraction failed: {}", err))
        }
    }
}
