// SPDX-License-Identifier: GPL-3.0-only
// Shared types for the camera backend

//! Shared types for camera capture

use std::sync::Arc;
use std::time::Instant;

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Human readable name from the device provider
    pub name: String,
    /// Device node (e.g. /dev/video0) when the provider reports one
    pub path: Option<String>,
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} ({})", self.name, path),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Requested capture format
///
/// Unset fields let the camera negotiate its native value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureFormat {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub framerate: Option<u32>,
}

impl CaptureFormat {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            framerate: None,
        }
    }

    /// Raw caps fields for a capsfilter, e.g. `,width=640,height=480`
    pub fn caps_fields(&self) -> String {
        let mut fields = String::new();
        if let (Some(w), Some(h)) = (self.width, self.height) {
            fields.push_str(&format!(",width={},height={}", w, h));
        }
        if let Some(fps) = self.framerate {
            fields.push_str(&format!(",framerate={}/1", fps));
        }
        fields
    }
}

impl std::fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.width, self.height) {
            (Some(w), Some(h)) => write!(f, "{}x{}", w, h)?,
            _ => write!(f, "native")?,
        }
        if let Some(fps) = self.framerate {
            write!(f, "@{}fps", fps)?;
        }
        Ok(())
    }
}

/// A single RGBA frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride (bytes per row, may include padding)
    pub stride: u32,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    /// True when the buffer covers every row the header describes
    pub fn is_complete(&self) -> bool {
        if self.width == 0 || self.height == 0 || self.stride < self.width * 4 {
            return false;
        }
        let needed = (self.height as usize - 1) * self.stride as usize + self.width as usize * 4;
        self.data.len() >= needed
    }

    /// RGB value at (x, y), clamped to the frame; black when out of buffer
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y * self.stride + x * 4) as usize;
        match self.data.get(idx..idx + 3) {
            Some(px) => (px[0], px[1], px[2]),
            None => (0, 0, 0),
        }
    }
}

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone)]
pub enum BackendError {
    /// GStreamer could not be initialized
    NotAvailable(String),
    /// Failed to build or start a pipeline
    InitializationFailed(String),
    /// Error reported on the pipeline bus while running
    Pipeline(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::Pipeline(msg) => write!(f, "Pipeline error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<BackendError> for crate::errors::CameraError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InitializationFailed(msg) => {
                crate::errors::CameraError::InitializationFailed(msg)
            }
            other => crate::errors::CameraError::BackendError(other.to_string()),
        }
    }
}

impl From<BackendError> for crate::errors::AppError {
    fn from(err: BackendError) -> Self {
        crate::errors::AppError::Camera(err.into())
    }
}
