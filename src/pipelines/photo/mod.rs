// SPDX-License-Identifier: GPL-3.0-only

//! Photo pipeline
//!
//! ```text
//! CameraFrame (RGBA) ──▶ Snapshot (RgbImage) ──▶ PhotoEncoder ──▶ MediaFile
//! ```

pub mod capture;
pub mod encoding;

pub use capture::Snapshot;
pub use encoding::{EncodedImage, EncodingFormat, EncodingQuality, PhotoEncoder};

use crate::backends::camera::types::CameraFrame;
use crate::config::Config;
use crate::errors::PhotoError;
use crate::upload::MediaFile;
use tracing::info;

/// Snapshot + encode in one step
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoPipeline {
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    pub fn new(encoder: PhotoEncoder) -> Self {
        Self { encoder }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(PhotoEncoder::new(
            config.photo_format.into(),
            config.photo_quality,
        ))
    }

    /// Turn the newest preview frame into an uploadable photo
    pub async fn capture(&self, frame: Option<&CameraFrame>) -> Result<MediaFile, PhotoError> {
        let image = Snapshot::from_latest(frame)?;
        let encoded = self.encoder.encode(image).await?;
        info!(
            width = encoded.width,
            height = encoded.height,
            bytes = encoded.data.len(),
            "Photo captured"
        );
        Ok(encoded.into_media_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_from_frame() {
        let frame = CameraFrame::from_rgba(8, 6, vec![200; 8 * 6 * 4]);
        let photo = PhotoPipeline::default().capture(Some(&frame)).await.unwrap();
        assert_eq!(photo.file_name, "photo.jpg");
        assert!(!photo.bytes.is_empty());
    }
}
