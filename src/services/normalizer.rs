//! Recognition metadata normalization
//!
//! Maps the raw identify response into the canonical [`SongIdentification`]
//! record. Required fields (title, first artist name) gate the whole result;
//! optional fields degrade independently to sentinels or `None` following a
//! fixed resolution order.

use std::collections::HashMap;

use crate::models::{SongIdentification, UNKNOWN_ALBUM, UNKNOWN_RELEASE_DATE};
use crate::services::acrcloud::{AcrMusic, AcrResponse};

/// Normalize an identify response into a canonical record.
///
/// Returns `None` when the status code is non-zero or the first music entry
/// lacks a title or artist name. Album name and release date fall back to
/// their sentinels; the release date is read from the album object first,
/// then from the top-level field. Confidence is the status score scaled to
/// `[0, 100]`, and stays `None` only when the service omits the score.
pub fn normalize(response: &AcrResponse) -> Option<SongIdentification> {
    if response.status.code != 0 {
        return None;
    }

    let music = response.metadata.as_ref()?.music.as_ref()?.first()?;

    let title = music.title.clone()?;
    let artist = music.artists.as_ref()?.first()?.name.clone();

    let mut album = UNKNOWN_ALBUM.to_string();
    let mut release_date = UNKNOWN_RELEASE_DATE.to_string();

    if let Some(album_info) = &music.album {
        if let Some(name) = &album_info.name {
            album = name.clone();
        }
        if let Some(date) = &album_info.release_date {
            release_date = date.clone();
        }
    }

    if release_date == UNKNOWN_RELEASE_DATE {
        if let Some(date) = &music.release_date {
            release_date = date.clone();
        }
    }

    let confidence = response.status.score.map(|score| score * 100.0);

    Some(SongIdentification {
        title,
        artist,
        album,
        confidence,
        release_date,
        album_art: resolve_album_art(music),
        youtube_id: String::new(),
        spotify_id: String::new(),
        external_ids: HashMap::new(),
    })
}

/// Artwork URL in provider preference order: Spotify album images, Deezer
/// medium cover, Deezer cover, then a direct image on the album object.
/// Best-effort; yields `None` rather than failing the record.
fn resolve_album_art(music: &AcrMusic) -> Option<String> {
    if let Some(external) = &music.external_metadata {
        let spotify_art = external
            .spotify
            .as_ref()
            .and_then(|spotify| spotify.album.as_ref())
            .and_then(|album| album.images.as_ref())
            .and_then(|images| images.first())
            .and_then(|image| image.url());
        if let Some(url) = spotify_art {
            return Some(url.to_string());
        }

        if let Some(album) = external.deezer.as_ref().and_then(|deezer| deezer.album.as_ref()) {
            if let Some(url) = &album.cover_medium {
                return Some(url.clone());
            }
            if let Some(url) = &album.cover {
                return Some(url.clone());
            }
        }
    }

    music
        .album
        .as_ref()
        .and_then(|album| album.images.as_ref())
        .and_then(|images| images.first())
        .and_then(|image| image.url())
        .map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> AcrResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_full_match() {
        let response = response(json!({
            "status": {"code": 0, "msg": "Success", "score": 0.87},
            "metadata": {"music": [{
                "title": "Blinding Lights",
                "artists": [{"name": "The Weeknd"}],
                "album": {"name": "After Hours", "release_date": "2020-03-20"},
                "external_metadata": {
                    "spotify": {"album": {"images": [{"url": "http://img/spotify.jpg"}]}}
                }
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.title, "Blinding Lights");
        assert_eq!(song.artist, "The Weeknd");
        assert_eq!(song.album, "After Hours");
        assert_eq!(song.release_date, "2020-03-20");
        assert_eq!(song.confidence, Some(87.0));
        assert_eq!(song.album_art.as_deref(), Some("http://img/spotify.jpg"));
        assert_eq!(song.youtube_id, "");
        assert_eq!(song.spotify_id, "");
        assert!(song.external_ids.is_empty());
    }

    #[test]
    fn test_normalize_rejects_non_zero_status() {
        let response = response(json!({
            "status": {"code": 1001, "msg": "No result"},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}]
            }]}
        }));
        assert!(normalize(&response).is_none());
    }

    #[test]
    fn test_normalize_requires_title_and_artist() {
        let no_music = response(json!({"status": {"code": 0}, "metadata": {"music": []}}));
        assert!(normalize(&no_music).is_none());

        let no_title = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{"artists": [{"name": "Artist"}]}]}
        }));
        assert!(normalize(&no_title).is_none());

        let no_artists = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{"title": "Song", "artists": []}]}
        }));
        assert!(normalize(&no_artists).is_none());
    }

    #[test]
    fn test_normalize_sentinels_without_album() {
        let response = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}]
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.album, "Unknown Album");
        assert_eq!(song.release_date, "Unknown");
        assert_eq!(song.confidence, None);
        assert_eq!(song.album_art, None);
    }

    #[test]
    fn test_normalize_album_fields() {
        let response = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}],
                "album": {"name": "X", "release_date": "2020"}
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.album, "X");
        assert_eq!(song.release_date, "2020");
    }

    #[test]
    fn test_normalize_release_date_top_level_fallback() {
        let response = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}],
                "album": {"name": "X"},
                "release_date": "1999-09-09"
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.release_date, "1999-09-09");
    }

    #[test]
    fn test_normalize_album_release_date_wins_over_top_level() {
        let response = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}],
                "album": {"name": "X", "release_date": "2020"},
                "release_date": "1999"
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.release_date, "2020");
    }

    #[test]
    fn test_normalize_zero_score_is_not_null() {
        let response = response(json!({
            "status": {"code": 0, "score": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}]
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.confidence, Some(0.0));
    }

    #[test]
    fn test_normalize_null_score_is_null() {
        let response = response(json!({
            "status": {"code": 0, "score": null},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}]
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.confidence, None);
    }

    #[test]
    fn test_album_art_prefers_spotify() {
        let response = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}],
                "album": {"images": ["http://img/direct.jpg"]},
                "external_metadata": {
                    "spotify": {"album": {"images": [{"url": "http://img/spotify.jpg"}]}},
                    "deezer": {"album": {"cover_medium": "http://img/deezer-m.jpg"}}
                }
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.album_art.as_deref(), Some("http://img/spotify.jpg"));
    }

    #[test]
    fn test_album_art_deezer_medium_before_cover() {
        let response = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}],
                "external_metadata": {
                    "deezer": {"album": {
                        "cover_medium": "http://img/deezer-m.jpg",
                        "cover": "http://img/deezer.jpg"
                    }}
                }
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.album_art.as_deref(), Some("http://img/deezer-m.jpg"));
    }

    #[test]
    fn test_album_art_deezer_cover_fallback() {
        let response = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}],
                "external_metadata": {
                    "deezer": {"album": {"cover": "http://img/deezer.jpg"}}
                }
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.album_art.as_deref(), Some("http://img/deezer.jpg"));
    }

    #[test]
    fn test_album_art_direct_album_image_string_or_object() {
        let as_string = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}],
                "album": {"images": ["http://img/direct.jpg"]}
            }]}
        }));
        assert_eq!(
            normalize(&as_string).unwrap().album_art.as_deref(),
            Some("http://img/direct.jpg")
        );

        let as_object = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}],
                "album": {"images": [{"url": "http://img/direct.jpg"}]}
            }]}
        }));
        assert_eq!(
            normalize(&as_object).unwrap().album_art.as_deref(),
            Some("http://img/direct.jpg")
        );
    }

    #[test]
    fn test_album_art_malformed_branch_degrades_to_none() {
        // images carried as a non-array shape must not fail the record
        let response = response(json!({
            "status": {"code": 0},
            "metadata": {"music": [{
                "title": "Song",
                "artists": [{"name": "Artist"}],
                "album": {"name": "X", "images": 42}
            }]}
        }));

        let song = normalize(&response).unwrap();
        assert_eq!(song.album, "X");
        assert_eq!(song.album_art, None);
    }
}
