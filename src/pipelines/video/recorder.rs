// SPDX-License-Identifier: MPL-2.0

//! Video recording pipeline
//!
//! Records WebM/VP8 into memory:
//! - the muxer runs in streamable mode and its output buffers are collected
//!   as [`RecordedChunks`], then joined into one blob on stop
//! - preview continues during recording (tee-based pipeline)

use super::chunks::RecordedChunks;
use crate::backends::camera::pipeline::{
    appsink_by_name, check_bus_for_errors, install_frame_callbacks, launch_pipeline,
    rgba_conversion_chain, source_description,
};
use crate::backends::camera::types::{CameraDevice, CaptureFormat, FrameSender};
use crate::constants::{BitratePreset, pipeline, recording, timing};
use crate::errors::RecordingError;
use crate::upload::MediaFile;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Width assumed for bitrate selection when the camera negotiates its own size
const FALLBACK_WIDTH: u32 = 640;

/// Recorder settings
pub struct VideoRecorderConfig<'a> {
    /// Camera to record from; `None` uses the system default
    pub device: Option<&'a CameraDevice>,
    pub format: CaptureFormat,
    pub bitrate: BitratePreset,
    /// Keeps the preview alive while recording
    pub preview_sender: Option<FrameSender>,
}

/// A finished recording
#[derive(Debug, Clone)]
pub struct Recording {
    pub file: MediaFile,
    pub duration: Duration,
    pub chunk_count: usize,
}

/// Build the recorder pipeline description
pub fn build_recorder_pipeline_string(
    device: Option<&CameraDevice>,
    format: &CaptureFormat,
    bitrate: BitratePreset,
    with_preview: bool,
) -> String {
    let bitrate_bps = bitrate.bitrate_kbps(format.width.unwrap_or(FALLBACK_WIDTH)) * 1000;
    let mut desc = format!(
        "{} ! {} ! tee name=t \
         t. ! queue ! videoconvert ! vp8enc deadline={} target-bitrate={} \
         ! webmmux streamable=true ! appsink name=recsink",
        source_description(device),
        rgba_conversion_chain(format),
        pipeline::VP8_DEADLINE,
        bitrate_bps,
    );
    if with_preview {
        desc.push_str(&format!(
            " t. ! queue leaky=downstream max-size-buffers={} ! appsink name=preview",
            pipeline::MAX_BUFFERS
        ));
    }
    desc
}

/// Video recorder
pub struct VideoRecorder {
    pipeline: gst::Pipeline,
    recsink: AppSink,
    preview: Option<AppSink>,
    chunks: Arc<Mutex<RecordedChunks>>,
    started_at: Option<Instant>,
}

impl VideoRecorder {
    /// Build the recording pipeline (not started)
    pub fn new(config: VideoRecorderConfig<'_>) -> Result<Self, RecordingError> {
        info!(
            device = ?config.device.map(|d| d.name.as_str()),
            format = %config.format,
            bitrate = ?config.bitrate,
            preview = config.preview_sender.is_some(),
            "Creating video recorder"
        );

        let description = build_recorder_pipeline_string(
            config.device,
            &config.format,
            config.bitrate,
            config.preview_sender.is_some(),
        );
        let pipeline = launch_pipeline(&description)
            .map_err(|e| RecordingError::StartFailed(e.to_string()))?;

        let recsink = appsink_by_name(&pipeline, "recsink")
            .map_err(|e| RecordingError::StartFailed(e.to_string()))?;
        let chunks = Arc::new(Mutex::new(RecordedChunks::new()));
        Self::install_chunk_callbacks(&recsink, Arc::clone(&chunks));

        let preview = match config.preview_sender {
            Some(sender) => {
                let appsink = appsink_by_name(&pipeline, "preview")
                    .map_err(|e| RecordingError::StartFailed(e.to_string()))?;
                appsink.set_caps(Some(
                    &gst::Caps::builder("video/x-raw")
                        .field("format", pipeline::OUTPUT_FORMAT)
                        .build(),
                ));
                install_frame_callbacks(&appsink, sender);
                Some(appsink)
            }
            None => None,
        };

        Ok(Self {
            pipeline,
            recsink,
            preview,
            chunks,
            started_at: None,
        })
    }

    /// Collect every muxer output buffer, never dropping
    fn install_chunk_callbacks(recsink: &AppSink, chunks: Arc<Mutex<RecordedChunks>>) {
        recsink.set_property("sync", false);
        recsink.set_property("emit-signals", false);
        recsink.set_property("drop", false);
        recsink.set_property("max-buffers", 0u32);

        recsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let sample = appsink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                    let buffer = sample.buffer().ok_or(gst::FlowError::Error)?;
                    let map = buffer.map_readable().map_err(|_| gst::FlowError::Error)?;

                    let mut chunks = chunks.lock().unwrap_or_else(|e| e.into_inner());
                    chunks.push(map.as_slice().to_vec());
                    Ok(gst::FlowSuccess::Ok)
                })
                .build(),
        );
    }

    /// Start recording
    pub fn start(&mut self) -> Result<(), RecordingError> {
        info!("Starting video recording");
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| RecordingError::StartFailed(e.to_string()))?;

        check_bus_for_errors(&self.pipeline)
            .map_err(|e| RecordingError::StartFailed(e.to_string()))?;

        self.started_at = Some(Instant::now());
        Ok(())
    }

    /// Bytes collected so far
    pub fn recorded_bytes(&self) -> usize {
        self.chunks
            .lock()
            .map(|c| c.total_bytes())
            .unwrap_or_else(|e| e.into_inner().total_bytes())
    }

    /// Stop recording and assemble the container
    pub fn stop(self) -> Result<Recording, RecordingError> {
        let started_at = self.started_at.ok_or(RecordingError::NotRecording)?;
        info!("Stopping video recording");

        // EOS lets webmmux flush its last cluster
        if !self.pipeline.send_event(gst::event::Eos::new()) {
            warn!("Failed to send EOS event to pipeline");
        }

        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| RecordingError::StopFailed("No bus available".to_string()))?;
        match bus.timed_pop_filtered(
            gst::ClockTime::from_seconds(timing::EOS_TIMEOUT_SECS),
            &[gst::MessageType::Eos, gst::MessageType::Error],
        ) {
            Some(msg) => match msg.view() {
                gst::MessageView::Eos(_) => debug!("Recorder drained"),
                gst::MessageView::Error(err) => {
                    error!(error = %err.error(), debug = ?err.debug(), "Error while draining recorder");
                }
                _ => {}
            },
            None => warn!(
                timeout_secs = timing::EOS_TIMEOUT_SECS,
                "Timed out waiting for EOS, keeping what was muxed"
            ),
        }

        self.pipeline
            .set_state(gst::State::Null)
            .map_err(|e| RecordingError::StopFailed(e.to_string()))?;

        let duration = started_at.elapsed();
        let (chunk_count, blob) = {
            let mut chunks = self.chunks.lock().unwrap_or_else(|e| e.into_inner());
            (chunks.len(), chunks.take_blob())
        };
        if blob.is_empty() {
            return Err(RecordingError::Empty);
        }

        info!(
            bytes = blob.len(),
            chunks = chunk_count,
            duration_ms = duration.as_millis() as u64,
            "Recording assembled"
        );

        Ok(Recording {
            file: MediaFile::new(blob, recording::FILE_NAME, recording::MIME),
            duration,
            chunk_count,
        })
    }
}

impl Drop for VideoRecorder {
    fn drop(&mut self) {
        self.recsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        if let Some(preview) = &self.preview {
            preview.set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        }
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_pipeline_without_preview() {
        let desc = build_recorder_pipeline_string(
            None,
            &CaptureFormat::new(1280, 720),
            BitratePreset::Medium,
            false,
        );
        assert!(desc.starts_with("autovideosrc ! decodebin"));
        assert!(desc.contains("vp8enc deadline=1 target-bitrate=2500000"));
        assert!(desc.contains("webmmux streamable=true ! appsink name=recsink"));
        assert!(!desc.contains("name=preview"));
    }

    #[test]
    fn test_recorder_pipeline_with_preview_branch() {
        let desc = build_recorder_pipeline_string(
            None,
            &CaptureFormat::default(),
            BitratePreset::Low,
            true,
        );
        assert!(desc.contains("target-bitrate=500000"));
        assert!(desc.ends_with("t. ! queue leaky=downstream max-size-buffers=2 ! appsink name=preview"));
    }
}
