// SPDX-License-Identifier: MPL-2.0

//! GStreamer pipeline for live camera capture
//!
//! `source ! decodebin ! videoconvert ! videoscale ! RGBA caps ! appsink`
//!
//! `decodebin` lets MJPEG-only webcams and raw YUYV webcams share one
//! pipeline description.

use super::types::*;
use crate::constants::{pipeline, timing};
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Source element description for a camera
///
/// Known V4L2 nodes go straight to `v4l2src`; anything else lets
/// `autovideosrc` pick the system default camera.
pub fn source_description(device: Option<&CameraDevice>) -> String {
    match device.and_then(|d| d.path.as_deref()) {
        Some(path) => format!("v4l2src device=\"{}\"", path.replace('"', "")),
        None => "autovideosrc".to_string(),
    }
}

/// Decode/convert chain ending in raw RGBA with the requested size
pub fn rgba_conversion_chain(format: &CaptureFormat) -> String {
    let rate = if format.framerate.is_some() {
        "videorate ! "
    } else {
        ""
    };
    format!(
        "decodebin ! videoconvert ! videoscale ! {}video/x-raw,format={}{}",
        rate,
        pipeline::OUTPUT_FORMAT,
        format.caps_fields()
    )
}

/// Full preview pipeline description
pub fn build_capture_pipeline_string(device: Option<&CameraDevice>, format: &CaptureFormat) -> String {
    format!(
        "{} ! {} ! appsink name=sink",
        source_description(device),
        rgba_conversion_chain(format)
    )
}

/// Parse a pipeline description into a `gst::Pipeline`
pub(crate) fn launch_pipeline(description: &str) -> BackendResult<gst::Pipeline> {
    gst::init().map_err(|e| BackendError::NotAvailable(e.to_string()))?;

    info!(pipeline = %description, "Launching pipeline");
    gst::parse::launch(description)
        .map_err(|e| BackendError::InitializationFailed(e.to_string()))?
        .downcast::<gst::Pipeline>()
        .map_err(|_| BackendError::InitializationFailed("Not a pipeline".to_string()))
}

/// Look up an appsink by element name
pub(crate) fn appsink_by_name(pipeline: &gst::Pipeline, name: &str) -> BackendResult<AppSink> {
    pipeline
        .by_name(name)
        .ok_or_else(|| BackendError::InitializationFailed(format!("Failed to get {}", name)))?
        .dynamic_cast::<AppSink>()
        .map_err(|_| BackendError::InitializationFailed(format!("Failed to cast {}", name)))
}

/// Wait briefly for errors right after a state change
///
/// Device-busy and permission failures arrive asynchronously on the bus,
/// not from `set_state`.
pub(crate) fn check_bus_for_errors(pipeline: &gst::Pipeline) -> BackendResult<()> {
    let bus = pipeline
        .bus()
        .ok_or_else(|| BackendError::Other("No bus available".to_string()))?;

    if let Some(msg) = bus.timed_pop_filtered(
        gst::ClockTime::from_mseconds(timing::START_ERROR_WINDOW_MS),
        &[gst::MessageType::Error, gst::MessageType::Warning],
    ) {
        match msg.view() {
            gst::MessageView::Error(err) => {
                error!(
                    error = %err.error(),
                    debug = ?err.debug(),
                    source = ?err.src().map(|s| s.name()),
                    "GStreamer error during start"
                );
                return Err(BackendError::InitializationFailed(err.error().to_string()));
            }
            gst::MessageView::Warning(w) => {
                warn!(
                    warning = %w.error(),
                    debug = ?w.debug(),
                    source = ?w.src().map(|s| s.name()),
                    "GStreamer warning during start"
                );
            }
            _ => {}
        }
    }
    Ok(())
}

/// Configure an appsink to deliver RGBA frames to `frame_sender`
///
/// Frames are dropped rather than queued when the receiver falls behind.
pub(crate) fn install_frame_callbacks(appsink: &AppSink, frame_sender: FrameSender) {
    appsink.set_property("emit-signals", false);
    appsink.set_property("sync", false);
    appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
    appsink.set_property("drop", true);
    appsink.set_property("enable-last-sample", false);

    appsink.set_callbacks(
        gstreamer_app::AppSinkCallbacks::builder()
            .new_sample(move |appsink| {
                let frame_start = Instant::now();
                let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                let sample = appsink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                let buffer = sample.buffer().ok_or(gst::FlowError::Error)?;

                if buffer.flags().contains(gst::BufferFlags::CORRUPTED) {
                    if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                        warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
                    }
                    // Skip the frame, keep streaming
                    return Ok(gst::FlowSuccess::Ok);
                }

                let caps = sample.caps().ok_or(gst::FlowError::Error)?;
                let video_info = VideoInfo::from_caps(caps).map_err(|e| {
                    error!(frame = frame_num, error = ?e, "Failed to get video info");
                    gst::FlowError::Error
                })?;
                let map = buffer.map_readable().map_err(|_| gst::FlowError::Error)?;

                let frame = CameraFrame {
                    width: video_info.width(),
                    height: video_info.height(),
                    data: Arc::from(map.as_slice()),
                    stride: video_info.stride()[0] as u32,
                    captured_at: frame_start,
                };

                let mut sender = frame_sender.clone();
                match sender.try_send(frame) {
                    Ok(()) => {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            debug!(
                                frame = frame_num,
                                width = video_info.width(),
                                height = video_info.height(),
                                copy_us = frame_start.elapsed().as_micros(),
                                "Frame delivered"
                            );
                        }
                    }
                    Err(e) if e.is_disconnected() => {
                        debug!("Frame receiver gone, stopping stream");
                        return Err(gst::FlowError::Eos);
                    }
                    Err(_) => {
                        if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                            debug!(frame = frame_num, "Frame dropped (channel full)");
                        }
                    }
                }

                Ok(gst::FlowSuccess::Ok)
            })
            .build(),
    );
}

/// Live camera preview pipeline
///
/// Playing from construction until dropped.
pub struct CapturePipeline {
    pipeline: gst::Pipeline,
    appsink: AppSink,
}

impl CapturePipeline {
    /// Acquire the camera and start streaming frames to `frame_sender`
    pub fn new(
        device: Option<&CameraDevice>,
        format: &CaptureFormat,
        frame_sender: FrameSender,
    ) -> BackendResult<Self> {
        info!(
            device = %device.map(|d| d.to_string()).unwrap_or_else(|| "default".to_string()),
            format = %format,
            "Creating capture pipeline"
        );

        let pipeline = launch_pipeline(&build_capture_pipeline_string(device, format))?;
        let appsink = appsink_by_name(&pipeline, "sink")?;
        install_frame_callbacks(&appsink, frame_sender);

        pipeline.set_state(gst::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to start pipeline: {}", e))
        })?;

        let capture = Self { pipeline, appsink };

        // Errors go through Drop, which releases the device
        check_bus_for_errors(&capture.pipeline)?;

        let (_, state, pending) = capture.pipeline.state(gst::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(state = ?state, pending = ?pending, "Pipeline state");
        if state != gst::State::Playing {
            warn!("Pipeline is not in PLAYING state");
        }

        info!("Camera capture started");
        Ok(capture)
    }

    /// Pop a pending error from the bus without blocking
    pub fn poll_error(&self) -> Option<BackendError> {
        let bus = self.pipeline.bus()?;
        let msg = bus.pop_filtered(&[gst::MessageType::Error])?;
        match msg.view() {
            gst::MessageView::Error(err) => {
                error!(error = %err.error(), debug = ?err.debug(), "Capture pipeline error");
                Some(BackendError::Pipeline(err.error().to_string()))
            }
            _ => None,
        }
    }
}

impl Drop for CapturePipeline {
    fn drop(&mut self) {
        info!("Stopping capture pipeline");
        // Release the sender clone held by the callback
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        let _ = self.pipeline.set_state(gst::State::Null);
        let _ = self
            .pipeline
            .state(gst::ClockTime::from_seconds(timing::STOP_TIMEOUT_SECS));
    }
}
