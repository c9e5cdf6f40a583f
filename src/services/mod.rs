//! External service clients and supporting logic

pub mod acrcloud;
pub mod audio_source;
pub mod normalizer;
pub mod recommender;

pub use acrcloud::AcrCloudClient;
pub use audio_source::YtDlpExtractor;
pub use recommender::LastFmClient;
