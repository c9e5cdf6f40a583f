//! Canonical song identification record

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Album name used when the recognition service reports none.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Release date used when the recognition service reports none.
pub const UNKNOWN_RELEASE_DATE: &str = "Unknown";

/// One identified song, normalized from the recognition service response.
///
/// Either the whole record exists (with non-empty `title` and `artist`) or
/// identification failed and no record is produced; normalization never
/// yields a partially-filled song.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongIdentification {
    /// Track title
    pub title: String,
    /// First credited artist
    pub artist: String,
    /// Album name, or [`UNKNOWN_ALBUM`]
    pub album: String,
    /// Match confidence in percent (`[0, 100]`); `None` when the service
    /// omitted its score (a reported score of `0` is `Some(0.0)`)
    pub confidence: Option<f64>,
    /// Release date, or [`UNKNOWN_RELEASE_DATE`]
    pub release_date: String,
    /// Album artwork URL, best-effort
    pub album_art: Option<String>,
    /// Reserved for future enrichment; always empty
    pub youtube_id: String,
    /// Reserved for future enrichment; always empty
    pub spotify_id: String,
    /// Reserved for future enrichment; always empty
    pub external_ids: HashMap<String, String>,
}
