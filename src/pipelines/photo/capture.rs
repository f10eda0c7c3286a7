// SPDX-License-Identifier: MPL-2.0

//! Snapshot extraction from the live preview
//!
//! Copies one RGBA camera frame into an off-screen RGB raster without
//! touching the preview stream.

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use image::RgbImage;
use tracing::debug;

/// Snapshot extractor
pub struct Snapshot;

impl Snapshot {
    /// Draw a frame into an RGB image buffer
    ///
    /// Row padding (`stride > width * 4`) is dropped and alpha discarded.
    pub fn from_frame(frame: &CameraFrame) -> Result<RgbImage, PhotoError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(PhotoError::InvalidFrame(format!(
                "{}x{} frame",
                frame.width, frame.height
            )));
        }
        if !frame.is_complete() {
            return Err(PhotoError::InvalidFrame(format!(
                "{} bytes for {}x{} (stride {})",
                frame.data.len(),
                frame.width,
                frame.height,
                frame.stride
            )));
        }

        let width = frame.width as usize;
        let stride = frame.stride as usize;
        let mut rgb = Vec::with_capacity(width * frame.height as usize * 3);
        for row in frame.data.chunks(stride).take(frame.height as usize) {
            for px in row[..width * 4].chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
            }
        }

        debug!(width = frame.width, height = frame.height, "Snapshot extracted");

        RgbImage::from_raw(frame.width, frame.height, rgb)
            .ok_or_else(|| PhotoError::InvalidFrame("buffer size mismatch".to_string()))
    }

    /// Snapshot the newest preview frame, if any arrived yet
    pub fn from_latest(frame: Option<&CameraFrame>) -> Result<RgbImage, PhotoError> {
        let frame = frame.ok_or(PhotoError::NoFrameAvailable)?;
        Self::from_frame(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_snapshot_drops_alpha_and_padding() {
        // 2x2 frame, stride 12 (4 bytes padding per row)
        let data = vec![
            10, 20, 30, 255, 40, 50, 60, 255, 0, 0, 0, 0, //
            70, 80, 90, 255, 100, 110, 120, 255,
        ];
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: Arc::from(data),
            stride: 12,
            captured_at: std::time::Instant::now(),
        };

        let image = Snapshot::from_frame(&frame).unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(
            image.as_raw(),
            &vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120]
        );
    }

    #[test]
    fn test_truncated_frame_is_rejected() {
        let mut frame = CameraFrame::from_rgba(4, 4, vec![0; 64]);
        frame.data = Arc::from(vec![0u8; 40]);
        assert!(matches!(
            Snapshot::from_frame(&frame),
            Err(PhotoError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_no_frame_yet() {
        assert!(matches!(
            Snapshot::from_latest(None),
            Err(PhotoError::NoFrameAvailable)
        ));
    }
}
