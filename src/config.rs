//! Configuration loading
//!
//! Each key resolves by priority: environment variable first, then a
//! `songscout.toml` config file, then a compiled default where one exists.
//! The ACRCloud credentials have no default and fail startup when absent.
//!
//! The config file is looked up at `./songscout.toml`, then in the
//! platform config directory (`~/.config/songscout/songscout.toml` on
//! Linux). An unparseable file is ignored.

use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_YTDLP_PATH: &str = "yt-dlp";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// ACRCloud project host, e.g. `identify-eu-west-1.acrcloud.com`
    pub acr_host: String,
    pub acr_access_key: String,
    pub acr_access_secret: String,
    /// Absent key degrades every recommendation request to the fallback path
    pub lastfm_api_key: Option<String>,
    /// Listen address, `host:port`
    pub bind: String,
    /// Extraction tool binary name or path
    pub ytdlp_path: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let file = load_config_table();

        let acr_host = resolve("SONGSCOUT_ACR_HOST", "acr_host", &file).ok_or_else(|| {
            ConfigError::Missing(
                "ACRCloud host (set SONGSCOUT_ACR_HOST or 'acr_host' in songscout.toml)".into(),
            )
        })?;
        let acr_access_key =
            resolve("SONGSCOUT_ACR_ACCESS_KEY", "acr_access_key", &file).ok_or_else(|| {
                ConfigError::Missing(
                    "ACRCloud access key (set SONGSCOUT_ACR_ACCESS_KEY or 'acr_access_key' in songscout.toml)"
                        .into(),
                )
            })?;
        let acr_access_secret =
            resolve("SONGSCOUT_ACR_ACCESS_SECRET", "acr_access_secret", &file).ok_or_else(|| {
                ConfigError::Missing(
                    "ACRCloud access secret (set SONGSCOUT_ACR_ACCESS_SECRET or 'acr_access_secret' in songscout.toml)"
                        .into(),
                )
            })?;

        let lastfm_api_key = resolve("SONGSCOUT_LASTFM_API_KEY", "lastfm_api_key", &file);

        let bind = resolve("SONGSCOUT_BIND", "bind", &file)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let ytdlp_path = resolve("SONGSCOUT_YTDLP_PATH", "ytdlp_path", &file)
            .unwrap_or_else(|| DEFAULT_YTDLP_PATH.to_string());

        Ok(Self {
            acr_host,
            acr_access_key,
            acr_access_secret,
            lastfm_api_key,
            bind,
            ytdlp_path,
        })
    }
}

/// Resolve one key: environment variable, then config file entry.
fn resolve(env_var: &str, file_key: &str, file: &Option<toml::Value>) -> Option<String> {
    if let Ok(value) = std::env::var(env_var) {
        return Some(value);
    }

    file.as_ref()
        .and_then(|table| table.get(file_key))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

fn load_config_table() -> Option<toml::Value> {
    let path = find_config_file()?;
    let content = std::fs::read_to_string(&path).ok()?;

    match toml::from_str::<toml::Value>(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Ignoring unparseable config file");
            None
        }
    }
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("songscout.toml");
    if local.exists() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join("songscout").join("songscout.toml");
    user.exists().then_some(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 6] = [
        "SONGSCOUT_ACR_HOST",
        "SONGSCOUT_ACR_ACCESS_KEY",
        "SONGSCOUT_ACR_ACCESS_SECRET",
        "SONGSCOUT_LASTFM_API_KEY",
        "SONGSCOUT_BIND",
        "SONGSCOUT_YTDLP_PATH",
    ];

    fn clear_env() {
        for var in ALL_VARS {
            std::env::remove_var(var);
        }
    }

    fn set_required_env() {
        std::env::set_var("SONGSCOUT_ACR_HOST", "identify-test.acrcloud.com");
        std::env::set_var("SONGSCOUT_ACR_ACCESS_KEY", "test-key");
        std::env::set_var("SONGSCOUT_ACR_ACCESS_SECRET", "test-secret");
    }

    #[test]
    #[serial]
    fn test_load_with_required_env() {
        clear_env();
        set_required_env();

        let config = AppConfig::load().unwrap();
        assert_eq!(config.acr_host, "identify-test.acrcloud.com");
        assert_eq!(config.acr_access_key, "test-key");
        assert_eq!(config.acr_access_secret, "test-secret");
        assert_eq!(config.lastfm_api_key, None);
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.ytdlp_path, "yt-dlp");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_fails_without_acr_credentials() {
        clear_env();
        std::env::set_var("SONGSCOUT_ACR_HOST", "identify-test.acrcloud.com");

        let err = AppConfig::load().unwrap_err();
        assert!(err.to_string().contains("SONGSCOUT_ACR_ACCESS_KEY"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_with_overrides() {
        clear_env();
        set_required_env();
        std::env::set_var("SONGSCOUT_LASTFM_API_KEY", "lastfm-key");
        std::env::set_var("SONGSCOUT_BIND", "127.0.0.1:9090");
        std::env::set_var("SONGSCOUT_YTDLP_PATH", "/opt/bin/yt-dlp");

        let config = AppConfig::load().unwrap();
        assert_eq!(config.lastfm_api_key.as_deref(), Some("lastfm-key"));
        assert_eq!(config.bind, "127.0.0.1:9090");
        assert_eq!(config.ytdlp_path, "/opt/bin/yt-dlp");

        clear_env();
    }
}
