// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use camera_upload::constants::{BitratePreset, endpoints, form_fields, recording};

#[test]
fn test_bitrate_preset_values() {
    // Test that all presets exist (Low, Medium, High)
    assert_eq!(BitratePreset::ALL.len(), 3);
}

#[test]
fn test_bitrate_preset_ordering() {
    // Presets are ordered from lowest to highest quality
    let mut prev_bitrate = 0u32;
    for preset in BitratePreset::ALL {
        let bitrate = preset.bitrate_kbps(1280);
        assert!(
            bitrate > prev_bitrate,
            "Presets should be ordered from lowest to highest"
        );
        prev_bitrate = bitrate;
    }
}

#[test]
fn test_bitrate_scales_with_resolution() {
    let sd_bitrate = BitratePreset::Medium.bitrate_kbps(640);
    let hd_bitrate = BitratePreset::Medium.bitrate_kbps(1280);
    let fhd_bitrate = BitratePreset::Medium.bitrate_kbps(1920);

    assert!(sd_bitrate < hd_bitrate);
    assert!(hd_bitrate < fhd_bitrate);
    assert_eq!(BitratePreset::Medium.bitrate_kbps(3840), fhd_bitrate);
}

#[test]
fn test_bitrate_preset_display_names() {
    for preset in BitratePreset::ALL {
        assert!(
            !preset.display_name().is_empty(),
            "Preset {:?} has empty display name",
            preset
        );
    }
}

#[test]
fn test_server_contract() {
    assert_eq!(endpoints::UPLOAD_PHOTO, "/upload");
    assert_eq!(endpoints::UPLOAD_VIDEO, "/upload-video");
    assert_eq!(form_fields::VIDEO, "video");
    assert_eq!(recording::FILE_NAME, "video.webm");
    assert_eq!(recording::MIME, "video/webm");
}
