// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URL of the media server when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Default folder name for photos and videos saved locally
pub const DEFAULT_SAVE_FOLDER: &str = "Camera";

/// Environment variable that overrides the configured server URL
pub const SERVER_URL_ENV: &str = "CAMERA_UPLOAD_SERVER";

/// VP8 encoder bitrate presets for recordings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitratePreset {
    /// Smaller uploads, reduced quality
    Low,
    /// Balanced quality and upload size (default)
    #[default]
    Medium,
    /// Larger uploads, better quality
    High,
}

impl BitratePreset {
    pub const ALL: [BitratePreset; 3] = [
        BitratePreset::Low,
        BitratePreset::Medium,
        BitratePreset::High,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            BitratePreset::Low => "Low",
            BitratePreset::Medium => "Medium",
            BitratePreset::High => "High",
        }
    }

    /// Target bitrate in kbps for a given frame width
    ///
    /// WebM uploads go over plain HTTP, so these sit below what a local
    /// recorder would use:
    /// - SD (640x480): Low=0.5, Medium=1, High=2 Mbps
    /// - HD (1280x720): Low=1, Medium=2.5, High=5 Mbps
    /// - Full HD (1920x1080) and above: Low=2, Medium=4, High=8 Mbps
    pub fn bitrate_kbps(&self, width: u32) -> u32 {
        match (ResolutionTier::from_width(width), self) {
            (ResolutionTier::SD, BitratePreset::Low) => 500,
            (ResolutionTier::SD, BitratePreset::Medium) => 1_000,
            (ResolutionTier::SD, BitratePreset::High) => 2_000,
            (ResolutionTier::HD, BitratePreset::Low) => 1_000,
            (ResolutionTier::HD, BitratePreset::Medium) => 2_500,
            (ResolutionTier::HD, BitratePreset::High) => 5_000,
            (ResolutionTier::FullHD, BitratePreset::Low) => 2_000,
            (ResolutionTier::FullHD, BitratePreset::Medium) => 4_000,
            (ResolutionTier::FullHD, BitratePreset::High) => 8_000,
        }
    }
}

/// Resolution tiers for bitrate calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// 640x480 and below
    SD,
    /// 1280x720
    HD,
    /// 1920x1080 and above
    FullHD,
}

impl ResolutionTier {
    pub fn from_width(width: u32) -> Self {
        match width {
            w if w >= 1920 => ResolutionTier::FullHD,
            w if w >= 1280 => ResolutionTier::HD,
            _ => ResolutionTier::SD,
        }
    }
}

/// Media server endpoints
pub mod endpoints {
    pub const UPLOAD_PHOTO: &str = "/upload";
    pub const UPLOAD_VIDEO: &str = "/upload-video";
    pub const PHOTOS: &str = "/photos";
    pub const VIDEOS: &str = "/videos";
    /// Prefix for serving a single video by file name
    pub const VIDEO_BY_NAME: &str = "/video/";
}

/// Multipart field names expected by the upload endpoints
pub mod form_fields {
    pub const PHOTO: &str = "photo";
    pub const VIDEO: &str = "video";
}

/// Recording container
pub mod recording {
    pub const FILE_NAME: &str = "video.webm";
    pub const MIME: &str = "video/webm";
    pub const EXTENSION: &str = "webm";
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffer queue size (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Frames buffered between the appsink callback and the UI
    pub const FRAME_CHANNEL_CAPACITY: usize = 10;

    /// Output pixel format for preview appsinks
    pub const OUTPUT_FORMAT: &str = "RGBA";

    /// VP8 realtime deadline (microseconds per frame, 1 = fastest)
    pub const VP8_DEADLINE: i64 = 1;
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 300;

    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// How long to watch the bus for immediate errors after starting
    pub const START_ERROR_WINDOW_MS: u64 = 500;

    /// Upper bound on waiting for the muxer to drain after EOS
    pub const EOS_TIMEOUT_SECS: u64 = 5;

    /// Camera warm-up before a CLI snapshot is taken
    pub const CAMERA_WARMUP: Duration = Duration::from_millis(500);

    /// Give up on a CLI snapshot if no frame arrives
    pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Terminal input poll interval (~60 fps redraw)
    pub const UI_POLL_INTERVAL: Duration = Duration::from_millis(16);

    /// Notification banner lifetime
    pub const NOTIFICATION_TIMEOUT_SECS: u64 = 3;

    /// HTTP request timeout
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
