//! ACRCloud identification API client
//!
//! Uploads an audio sample to the ACRCloud `/v1/identify` endpoint and
//! deserializes the response. Requests are authenticated with an HMAC-SHA1
//! signature over a fixed request description, base64-encoded, as the
//! service requires.
//!
//! Response structs mirror the service's JSON loosely: every metadata field
//! is optional, and fields the service is known to ship with inconsistent
//! shapes (`album`, `images`) are parsed leniently so one malformed branch
//! cannot fail the whole response.

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::models::SongIdentification;
use crate::services::normalizer;

const IDENTIFY_PATH: &str = "/v1/identify";
const DATA_TYPE: &str = "audio";
const SIGNATURE_VERSION: &str = "1";
const USER_AGENT: &str = "songscout/0.1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// ACRCloud client errors
#[derive(Debug, Error)]
pub enum AcrCloudError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Identify response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrResponse {
    pub status: AcrStatus,
    #[serde(default)]
    pub metadata: Option<AcrMetadata>,
}

/// Status block; `code == 0` denotes a match
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrStatus {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrMetadata {
    #[serde(default)]
    pub music: Option<Vec<AcrMusic>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrMusic {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Option<Vec<AcrArtist>>,
    #[serde(default, deserialize_with = "lenient")]
    pub album: Option<AcrAlbum>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub external_metadata: Option<AcrExternalMetadata>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrAlbum {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<Vec<AcrImage>>,
}

/// Album image entry; the service ships either a bare URL string or an
/// object with a `url` field depending on the provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AcrImage {
    Url(String),
    Object {
        #[serde(default)]
        url: Option<String>,
    },
}

impl AcrImage {
    pub fn url(&self) -> Option<&str> {
        match self {
            AcrImage::Url(url) => Some(url),
            AcrImage::Object { url } => url.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrExternalMetadata {
    #[serde(default)]
    pub spotify: Option<AcrSpotify>,
    #[serde(default)]
    pub deezer: Option<AcrDeezer>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrSpotify {
    #[serde(default)]
    pub album: Option<AcrSpotifyAlbum>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrSpotifyAlbum {
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<Vec<AcrImage>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrDeezer {
    #[serde(default)]
    pub album: Option<AcrDeezerAlbum>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcrDeezerAlbum {
    #[serde(default)]
    pub cover_medium: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

/// Deserialize a field, yielding `None` instead of an error when the value
/// does not match the expected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

type HmacSha1 = Hmac<Sha1>;

/// ACRCloud API client
pub struct AcrCloudClient {
    http_client: reqwest::Client,
    base_url: String,
    access_key: String,
    access_secret: String,
}

impl AcrCloudClient {
    /// Client for a bare project host, e.g. `identify-eu-west-1.acrcloud.com`.
    pub fn new(
        host: &str,
        access_key: String,
        access_secret: String,
    ) -> Result<Self, AcrCloudError> {
        Self::with_base_url(format!("https://{}", host), access_key, access_secret)
    }

    /// Client for an explicit base URL, used by tests to point at a
    /// controlled endpoint.
    pub fn with_base_url(
        base_url: String,
        access_key: String,
        access_secret: String,
    ) -> Result<Self, AcrCloudError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AcrCloudError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            access_key,
            access_secret,
        })
    }

    /// Upload a raw audio sample to the identify endpoint.
    pub async fn identify(&self, sample: Vec<u8>) -> Result<AcrResponse, AcrCloudError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AcrCloudError::SigningError(e.to_string()))?
            .as_secs();
        let signature = self.sign(timestamp)?;
        let sample_bytes = sample.len();

        let form = reqwest::multipart::Form::new()
            .text("access_key", self.access_key.clone())
            .text("sample_bytes", sample_bytes.to_string())
            .text("timestamp", timestamp.to_string())
            .text("signature", signature)
            .text("data_type", DATA_TYPE)
            .text("signature_version", SIGNATURE_VERSION)
            .part(
                "sample",
                reqwest::multipart::Part::bytes(sample).file_name("sample"),
            );

        let url = format!("{}{}", self.base_url, IDENTIFY_PATH);

        tracing::debug!(sample_bytes, "Querying ACRCloud identify API");

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AcrCloudError::NetworkError(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AcrCloudError::ApiError(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| AcrCloudError::ParseError(e.to_string()))
    }

    /// Identify the audio file at `path` and normalize the match, if any,
    /// into a canonical record. `Ok(None)` means the service answered but
    /// found no match.
    pub async fn recognize_file(
        &self,
        path: &Path,
    ) -> Result<Option<SongIdentification>, AcrCloudError> {
        let sample = tokio::fs::read(path).await?;
        let response = self.identify(sample).await?;

        let song = normalizer::normalize(&response);
        match &song {
            Some(song) => {
                tracing::info!(title = %song.title, artist = %song.artist, "Song identified");
            }
            None => {
                tracing::info!(
                    code = response.status.code,
                    msg = response.status.msg.as_deref().unwrap_or(""),
                    "No recognition match"
                );
            }
        }

        Ok(song)
    }

    /// HMAC-SHA1 signature over the fixed request description, base64-encoded.
    fn sign(&self, timestamp: u64) -> Result<String, AcrCloudError> {
        let data = string_to_sign(&self.access_key, timestamp);
        hmac_sha1_base64(self.access_secret.as_bytes(), data.as_bytes())
    }
}

fn string_to_sign(access_key: &str, timestamp: u64) -> String {
    format!(
        "POST\n{}\n{}\n{}\n{}\n{}",
        IDENTIFY_PATH, access_key, DATA_TYPE, SIGNATURE_VERSION, timestamp
    )
}

fn hmac_sha1_base64(secret: &[u8], data: &[u8]) -> Result<String, AcrCloudError> {
    let mut mac =
        HmacSha1::new_from_slice(secret).map_err(|e| AcrCloudError::SigningError(e.to_string()))?;
    mac.update(data);
    Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}
