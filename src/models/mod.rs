//! Data models shared between services and API handlers

pub mod song;

pub use song::{SongIdentification, UNKNOWN_ALBUM, UNKNOWN_RELEASE_DATE};
