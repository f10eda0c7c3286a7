// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use camera_upload::Config;
use camera_upload::config::{PhotoOutputFormat, RecordingTarget};
use camera_upload::constants::{BitratePreset, DEFAULT_SERVER_URL};
use std::time::Duration;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(
        config.mirror_preview,
        "Mirror preview should be enabled by default"
    );
    assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    assert_eq!(config.recording_target, RecordingTarget::Upload);
    assert_eq!(config.photo_format, PhotoOutputFormat::Jpeg);
    assert_eq!(config.notification_timeout(), Duration::from_secs(3));
}

#[test]
fn test_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camera-upload").join("config.json");

    let config = Config {
        server_url: "http://media.local:8080".to_string(),
        camera_path: Some("/dev/video2".to_string()),
        bitrate_preset: BitratePreset::High,
        recording_target: RecordingTarget::Save,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error:"));
}

#[test]
fn test_server_override() {
    let config =
        Config::default().with_server_override(Some("http://192.168.1.20:5000/".to_string()));
    assert_eq!(config.server().base_url, "http://192.168.1.20:5000");

    let unchanged = Config::default().with_server_override(None);
    assert_eq!(unchanged.server_url, DEFAULT_SERVER_URL);
}
