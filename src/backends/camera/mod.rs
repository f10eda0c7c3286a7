// SPDX-License-Identifier: MPL-2.0

//! Camera backend
//!
//! Discovers cameras and runs the live capture pipeline that feeds the
//! preview and the snapshot extractor.
//!
//! ```text
//! ┌──────────────┐   RGBA frames   ┌───────────────┐
//! │CapturePipeline│ ─────────────▶ │ preview / photo│
//! └──────────────┘  (mpsc, lossy)  └───────────────┘
//! ```

pub mod enumeration;
pub mod pipeline;
pub mod types;

pub use enumeration::enumerate_cameras;
pub use pipeline::CapturePipeline;
pub use types::*;

use crate::errors::CameraError;

/// Pick a camera by index
pub fn select_camera(cameras: &[CameraDevice], index: usize) -> Result<&CameraDevice, CameraError> {
    if cameras.is_empty() {
        return Err(CameraError::NoCameraFound);
    }
    cameras.get(index).ok_or(CameraError::IndexOutOfRange {
        index,
        count: cameras.len(),
    })
}

/// Index of the camera matching a configured device path, else the first
pub fn preferred_camera_index(cameras: &[CameraDevice], preferred_path: Option<&str>) -> usize {
    preferred_path
        .and_then(|wanted| {
            cameras
                .iter()
                .position(|c| c.path.as_deref() == Some(wanted))
        })
        .unwrap_or(0)
}
