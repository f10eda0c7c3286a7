// SPDX-License-Identifier: GPL-3.0-only

//! Terminal UI state
//!
//! Everything the UI shows except the pixels: current page, recording
//! timer, notification banner, gallery listing. Kept free of GStreamer and
//! terminal handles so it can be driven by tests.

use crate::errors::{RecordingError, ServerError};
use crate::gallery::{GalleryItem, GalleryKind};
use crate::notification::Notification;
use crate::pipelines::video::{Recording, RecordingTimer, format_time};
use crate::upload::{MediaFile, MediaKind, UploadResponse};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Result of background work, delivered back to the UI thread
#[derive(Debug)]
pub enum TaskEvent {
    Uploaded {
        kind: MediaKind,
        /// Matches the id handed out by [`CaptureState::next_upload_id`]
        id: u64,
        result: Result<UploadResponse, ServerError>,
    },
    /// The recorder drained and released the camera
    RecordingFinished {
        result: Result<Recording, RecordingError>,
    },
    Saved {
        kind: MediaKind,
        result: Result<PathBuf, String>,
    },
    /// Capture or encode failed before anything could be sent
    CaptureFailed { kind: MediaKind, message: String },
    GalleryLoaded {
        kind: GalleryKind,
        result: Result<Vec<GalleryItem>, ServerError>,
    },
}

/// Which page is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Camera,
    Gallery(GalleryKind),
}

/// Gallery page contents
#[derive(Debug, Clone)]
pub struct GalleryState {
    pub kind: GalleryKind,
    pub items: Vec<GalleryItem>,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl GalleryState {
    pub fn loading(kind: GalleryKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            selected: 0,
            loading: true,
            error: None,
        }
    }

    /// A failed fetch leaves an empty list and an error line
    pub fn set_result(&mut self, result: Result<Vec<GalleryItem>, ServerError>) {
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(e) => {
                error!(kind = ?self.kind, error = %e, "Error fetching gallery");
                self.items.clear();
                self.error = Some(e.to_string());
            }
        }
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&GalleryItem> {
        self.items.get(self.selected)
    }
}

/// A recording held until its upload succeeds
#[derive(Debug, Clone)]
pub struct PendingVideo {
    pub id: u64,
    pub file: MediaFile,
    /// An upload of this file is running
    pub in_flight: bool,
}

/// Complete UI state
#[derive(Debug)]
pub struct CaptureState {
    pub page: Page,
    pub timer: RecordingTimer,
    pub notification: Notification,
    pub gallery: Option<GalleryState>,
    pub show_help: bool,
    pub multi_camera: bool,
    /// Recordings whose upload has not succeeded yet
    pub pending_videos: Vec<PendingVideo>,
    /// The recorder is draining on a worker thread
    pub finishing_recording: bool,
    last_upload_id: u64,
}

impl CaptureState {
    pub fn new(notification_timeout: Duration, multi_camera: bool) -> Self {
        Self {
            page: Page::Camera,
            timer: RecordingTimer::new(),
            notification: Notification::new(notification_timeout),
            gallery: None,
            show_help: false,
            multi_camera,
            pending_videos: Vec::new(),
            finishing_recording: false,
            last_upload_id: 0,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.timer.is_running()
    }

    pub fn begin_recording(&mut self, now: Instant) -> Result<(), RecordingError> {
        if self.is_recording() {
            return Err(RecordingError::AlreadyRecording);
        }
        if self.finishing_recording {
            return Err(RecordingError::StartFailed(
                "previous recording is still being finished".to_string(),
            ));
        }
        self.timer.start(now);
        Ok(())
    }

    /// Returns the elapsed seconds of the finished recording
    pub fn finish_recording(&mut self, now: Instant) -> Result<u64, RecordingError> {
        if !self.is_recording() {
            return Err(RecordingError::NotRecording);
        }
        Ok(self.timer.stop(now))
    }

    pub fn next_upload_id(&mut self) -> u64 {
        self.last_upload_id += 1;
        self.last_upload_id
    }

    /// Hold a recording for retries; returns the id its upload reports with
    pub fn queue_video(&mut self, file: MediaFile) -> u64 {
        let id = self.next_upload_id();
        self.pending_videos.push(PendingVideo {
            id,
            file,
            in_flight: true,
        });
        id
    }

    /// Failed recordings to send again, now marked in flight
    ///
    /// Recordings whose upload is still running are skipped.
    pub fn take_retries(&mut self) -> Vec<(u64, MediaFile)> {
        self.pending_videos
            .iter_mut()
            .filter(|video| !video.in_flight)
            .map(|video| {
                video.in_flight = true;
                (video.id, video.file.clone())
            })
            .collect()
    }

    pub fn has_retryable_video(&self) -> bool {
        self.pending_videos.iter().any(|video| !video.in_flight)
    }

    pub fn upload_started(&mut self, kind: MediaKind, now: Instant) {
        self.notification.show(kind.uploading_message(), now);
    }

    pub fn notify(&mut self, text: impl Into<String>, now: Instant) {
        self.notification.show(text, now);
    }

    /// Fold a background result into the UI
    ///
    /// A drained recording is handed back so the caller can deliver it.
    pub fn apply(&mut self, event: TaskEvent, now: Instant) -> Option<Recording> {
        match event {
            TaskEvent::Uploaded { kind, id, result } => match result {
                Ok(response) => {
                    info!(kind = ?kind, id, response = %response, "Uploaded");
                    self.pending_videos.retain(|video| video.id != id);
                    self.notification.show(kind.uploaded_message(), now);
                }
                Err(e) => {
                    error!(kind = ?kind, id, error = %e, "Upload failed");
                    if let Some(video) = self.pending_videos.iter_mut().find(|v| v.id == id) {
                        video.in_flight = false;
                    }
                    self.notification.show(kind.failed_message(), now);
                }
            },
            TaskEvent::RecordingFinished { result } => {
                self.finishing_recording = false;
                match result {
                    Ok(recording) => return Some(recording),
                    Err(e) => {
                        error!(error = %e, "Failed to stop recording");
                        self.notification.show(format!("Error: {}", e), now);
                    }
                }
            }
            TaskEvent::Saved { kind, result } => match result {
                Ok(path) => self.notification.show(format!("Saved: {}", path.display()), now),
                Err(e) => {
                    error!(kind = ?kind, error = %e, "Save failed");
                    self.notification.show(format!("Error: {}", e), now);
                }
            },
            TaskEvent::CaptureFailed { kind, message } => {
                error!(kind = ?kind, error = %message, "Capture failed");
                self.notification.show(format!("Error: {}", message), now);
            }
            TaskEvent::GalleryLoaded { kind, result } => {
                // Ignore listings for a page that is no longer open
                if let Some(gallery) = self.gallery.as_mut().filter(|g| g.kind == kind) {
                    gallery.set_result(result);
                }
            }
        }
        None
    }

    /// Switch to a gallery page in loading state
    pub fn open_gallery(&mut self, kind: GalleryKind) {
        self.page = Page::Gallery(kind);
        self.gallery = Some(GalleryState::loading(kind));
        self.show_help = false;
    }

    pub fn back_to_camera(&mut self) {
        self.page = Page::Camera;
        self.gallery = None;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Bottom status bar text
    pub fn status_line(&self, now: Instant) -> String {
        match self.page {
            Page::Gallery(_) => "↑/↓ select | Enter open | 'r' refresh | 'b' back | 'q' quit".to_string(),
            Page::Camera if self.is_recording() => format!(
                "Recording Time: {} | 'r' stop recording | 'p' photo",
                format_time(self.timer.elapsed_secs(now))
            ),
            Page::Camera if self.show_help => {
                let mut msg = String::from("p: Take photo | r: Start recording | ");
                if self.has_retryable_video() {
                    msg.push_str("u: Retry video upload | ");
                }
                if self.multi_camera {
                    msg.push_str("s: Switch camera | ");
                }
                msg.push_str("g: Photos | v: Videos | h: Toggle help | q/Ctrl+C: Quit");
                msg
            }
            Page::Camera => {
                let mut msg = "'p' photo | 'r' record".to_string();
                if self.has_retryable_video() {
                    msg.push_str(" | 'u' retry upload");
                }
                if self.multi_camera {
                    msg.push_str(" | 's' switch camera");
                }
                msg.push_str(" | 'g' photos | 'v' videos | 'h' help | 'q' quit");
                msg
            }
        }
    }
}
