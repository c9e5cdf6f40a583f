//! Audio source resolution
//!
//! Turns either an uploaded payload or a remote video URL into a local audio
//! file that the recognition client can read. Every resolved source is owned
//! by a [`ScopedAudio`] guard whose backing temp file or directory is removed
//! on drop, so cleanup happens on every exit path without explicit calls.
//!
//! URL sources are fetched with the `yt-dlp` command-line tool, requesting
//! the best available audio-only stream.

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};
use thiserror::Error;

/// Format selector passed to yt-dlp: preferred containers in fixed priority
/// order, then any audio-only stream.
const AUDIO_FORMAT_PRIORITY: &str =
    "bestaudio[ext=m4a]/bestaudio[ext=webm]/bestaudio[ext=mp3]/bestaudio";

/// Extensions accepted when scanning the extraction directory.
const AUDIO_EXTENSIONS: [&str; 4] = ["m4a", "webm", "mp3", "opus"];

/// Audio source resolution errors
#[derive(Debug, Error)]
pub enum AudioSourceError {
    /// URL is not a recognized video host
    #[error("Invalid YouTube URL")]
    InvalidSource(String),

    /// Extraction tool ran and reported a download error
    #[error("Failed to download YouTube video: {0}")]
    ExtractionFailed(String),

    /// Extraction tool succeeded but produced no audio artifact
    #[error("Failed to extract audio from YouTube video")]
    ExtractionEmpty,

    /// Extraction tool could not be executed at all
    #[error("Extraction tool unavailable: {0}")]
    ToolUnavailable(String),

    /// Local filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
enum Scope {
    File(#[allow(dead_code)] NamedTempFile),
    Dir(#[allow(dead_code)] TempDir),
}

/// A locally readable audio file with scoped lifetime.
///
/// The backing temp file (uploads) or temp directory (extractions) is deleted
/// when the guard drops, including on error and panic unwind paths.
#[derive(Debug)]
pub struct ScopedAudio {
    path: PathBuf,
    _scope: Scope,
}

impl ScopedAudio {
    /// Path of the resolved audio file, valid for the guard's lifetime.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write an uploaded payload verbatim to a fresh temp file.
///
/// No content inspection happens here; the handler boundary has already
/// checked the declared media type.
pub fn stage_upload(payload: &[u8]) -> Result<ScopedAudio, AudioSourceError> {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("songscout-")
        .suffix(".mp3")
        .tempfile()?;
    file.write_all(payload)?;
    file.flush()?;

    let path = file.path().to_path_buf();
    tracing::debug!(bytes = payload.len(), file = %path.display(), "Staged uploaded audio");

    Ok(ScopedAudio {
        path,
        _scope: Scope::File(file),
    })
}

/// Whether a URL belongs to the accepted video host.
pub fn is_supported_video_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Driver for the external `yt-dlp` extraction tool.
pub struct YtDlpExtractor {
    binary: String,
}

impl YtDlpExtractor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Fetch the best audio-only stream of a video URL into a scoped temp
    /// directory and select the extracted artifact.
    pub async fn extract_audio(&self, url: &str) -> Result<ScopedAudio, AudioSourceError> {
        if !is_supported_video_url(url) {
            return Err(AudioSourceError::InvalidSource(url.to_string()));
        }

        let dir = tempfile::Builder::new().prefix("songscout-").tempdir()?;
        let template = dir.path().join("audio.%(ext)s");

        tracing::debug!(url = %url, dir = %dir.path().display(), "Running audio extraction");

        let output = tokio::task::spawn_blocking({
            let binary = self.binary.clone();
            let template = template.clone();
            let url = url.to_string();

            move || {
                Command::new(&binary)
                    .arg("--format")
                    .arg(AUDIO_FORMAT_PRIORITY)
                    .arg("--output")
                    .arg(&template)
                    .arg("--no-warnings")
                    .arg("--quiet")
                    .arg(&url)
                    .output()
            }
        })
        .await
        .map_err(|e| AudioSourceError::ToolUnavailable(format!("task join error: {}", e)))?
        .map_err(|e| AudioSourceError::ToolUnavailable(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioSourceError::ExtractionFailed(
                stderr.trim().to_string(),
            ));
        }

        let path = find_audio_artifact(dir.path())?;

        tracing::info!(url = %url, file = %path.display(), "Audio stream extracted");

        Ok(ScopedAudio {
            path,
            _scope: Scope::Dir(dir),
        })
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

/// First directory entry (listing order) with an accepted audio extension.
fn find_audio_artifact(dir: &Path) -> Result<PathBuf, AudioSourceError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if AUDIO_EXTENSIONS.contains(&ext) {
            return Ok(path);
        }
    }
    Err(AudioSourceError::ExtractionEmpty)
}
