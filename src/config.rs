// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON at `$XDG_CONFIG_HOME/camera-upload/config.json`. A missing
//! file means defaults; unknown or missing keys fall back per field.

use crate::constants::{self, BitratePreset};
use crate::errors::{AppError, AppResult};
use crate::pipelines::photo::EncodingQuality;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const APP_DIR: &str = "camera-upload";
const CONFIG_FILE: &str = "config.json";

/// Output format for photos
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum PhotoOutputFormat {
    #[default]
    Jpeg,
    Png,
}

/// What happens to a recording when it stops
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum RecordingTarget {
    /// POST it to the media server
    #[default]
    Upload,
    /// Write it to the local videos folder
    Save,
}

/// Connection settings for the media server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    pub timeout: Duration,
}

impl ServerConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Media server base URL
    pub server_url: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Preferred camera device path (e.g. /dev/video0); first camera when unset
    pub camera_path: Option<String>,
    /// Mirror camera preview horizontally (selfie mode)
    pub mirror_preview: bool,
    /// Photo encoding format
    pub photo_format: PhotoOutputFormat,
    /// JPEG quality preset
    pub photo_quality: EncodingQuality,
    /// Video encoder bitrate preset
    pub bitrate_preset: BitratePreset,
    /// Upload recordings or keep them locally
    pub recording_target: RecordingTarget,
    /// Notification banner lifetime in seconds
    pub notification_timeout_secs: u64,
    /// Folder name under Pictures/Videos for locally saved media
    pub save_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: constants::DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: constants::timing::REQUEST_TIMEOUT_SECS,
            camera_path: None,
            mirror_preview: true,
            photo_format: PhotoOutputFormat::default(),
            photo_quality: EncodingQuality::High,
            bitrate_preset: BitratePreset::default(),
            recording_target: RecordingTarget::default(),
            notification_timeout_secs: constants::timing::NOTIFICATION_TIMEOUT_SECS,
            save_folder: constants::DEFAULT_SAVE_FOLDER.to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location and apply the environment override
    pub fn load() -> AppResult<Self> {
        let config = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        Ok(config.with_server_override(std::env::var(constants::SERVER_URL_ENV).ok()))
    }

    /// Load from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Replace the server URL when an override is present and non-empty
    pub fn with_server_override(mut self, server_url: Option<String>) -> Self {
        if let Some(url) = server_url.filter(|url| !url.trim().is_empty()) {
            debug!(url = %url, "Server URL overridden");
            self.server_url = url.trim().to_string();
        }
        self
    }

    pub fn server(&self) -> ServerConfig {
        ServerConfig::new(
            &self.server_url,
            Duration::from_secs(self.request_timeout_secs),
        )
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_trims_trailing_slash() {
        let server = ServerConfig::new("http://media.local:5000/", Duration::from_secs(1));
        assert_eq!(server.base_url, "http://media.local:5000");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = Config::default().with_server_override(Some("  ".to_string()));
        assert_eq!(config.server_url, constants::DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"server_url":"http://10.0.0.2:5000"}"#).unwrap();
        assert_eq!(config.server_url, "http://10.0.0.2:5000");
        assert_eq!(config.recording_target, RecordingTarget::Upload);
        assert!(config.mirror_preview);
    }
}
