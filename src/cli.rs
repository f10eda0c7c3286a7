// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking and uploading photos
//! - Recording and uploading videos
//! - Listing uploaded media

use camera_upload::backends::camera::{
    CameraDevice, CameraFrame, CapturePipeline, CaptureFormat, enumerate_cameras,
    preferred_camera_index, select_camera,
};
use camera_upload::config::{Config, RecordingTarget};
use camera_upload::constants::{pipeline, timing};
use camera_upload::gallery::{GalleryClient, GalleryKind};
use camera_upload::pipelines::photo::PhotoPipeline;
use camera_upload::pipelines::video::{VideoRecorder, VideoRecorderConfig, format_time};
use camera_upload::{delivery, storage};
use camera_upload::upload::{MediaFile, MediaKind, UploadClient};
use futures::channel::mpsc;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::error;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let cameras = enumerate_cameras();
    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        if let Some(path) = &camera.path {
            println!("      Device: {}", path);
        }
    }

    Ok(())
}

/// Camera chosen by index, the configured device, or the system default
fn resolve_camera(
    cameras: &[CameraDevice],
    index: Option<usize>,
    config: &Config,
) -> Result<Option<CameraDevice>, Box<dyn std::error::Error>> {
    let camera = match index {
        Some(index) => Some(select_camera(cameras, index)?.clone()),
        None if cameras.is_empty() => None,
        None => cameras
            .get(preferred_camera_index(cameras, config.camera_path.as_deref()))
            .cloned(),
    };
    match &camera {
        Some(camera) => println!("Using camera: {}", camera),
        None => println!("Using default camera"),
    }
    Ok(camera)
}

/// Take a photo and upload it, or save it with `--save-only`/`--output`
pub fn take_photo(
    config: &Config,
    camera_index: Option<usize>,
    save_only: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let cameras = enumerate_cameras();
    let camera = resolve_camera(&cameras, camera_index, config)?;

    println!("Capturing...");
    let (sender, mut receiver) = mpsc::channel(pipeline::FRAME_CHANNEL_CAPACITY);
    let capture = CapturePipeline::new(camera.as_ref(), &CaptureFormat::default(), sender)?;

    // Wait for frames to stabilize (camera warm-up)
    let start = Instant::now();
    let mut frame: Option<CameraFrame> = None;
    while start.elapsed() < timing::CAPTURE_TIMEOUT {
        if let Some(e) = capture.poll_error() {
            return Err(e.into());
        }
        match receiver.try_recv() {
            Ok(f) => {
                frame = Some(f);
                // After warmup period, use the next good frame
                if start.elapsed() > timing::CAMERA_WARMUP {
                    break;
                }
            }
            Err(_) => std::thread::sleep(timing::UI_POLL_INTERVAL),
        }
    }
    drop(capture);

    let frame = frame.ok_or("Failed to capture frame from camera")?;
    println!("Captured {}x{} frame", frame.width, frame.height);

    let rt = tokio::runtime::Runtime::new()?;
    let photo = rt.block_on(PhotoPipeline::from_config(config).capture(Some(&frame)))?;

    let save = save_only || output.is_some() || config.recording_target == RecordingTarget::Save;
    deliver(&rt, config, MediaKind::Photo, photo, save, output)
}

/// Record a video for `duration` seconds (Ctrl+C stops early), then upload or save it
pub fn record_video(
    config: &Config,
    camera_index: Option<usize>,
    duration: u64,
    save_only: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let cameras = enumerate_cameras();
    let camera = resolve_camera(&cameras, camera_index, config)?;
    println!("Duration: {} seconds", duration);
    println!("Bitrate: {}", config.bitrate_preset.display_name());

    let mut recorder = VideoRecorder::new(VideoRecorderConfig {
        device: camera.as_ref(),
        format: CaptureFormat::default(),
        bitrate: config.bitrate_preset,
        preview_sender: None,
    })?;

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    println!();
    println!("Recording... (press Ctrl+C to stop early)");
    recorder.start()?;

    let start = Instant::now();
    let target_duration = Duration::from_secs(duration);
    while start.elapsed() < target_duration {
        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping early...");
            break;
        }

        print!(
            "\rRecording: {} ({} KB)",
            format_time(start.elapsed().as_secs()),
            recorder.recorded_bytes() / 1024
        );
        std::io::Write::flush(&mut std::io::stdout())?;

        std::thread::sleep(Duration::from_millis(100));
    }
    println!();

    let recording = recorder.stop()?;
    println!(
        "Recorded {} ({} bytes)",
        format_time(recording.duration.as_secs()),
        recording.file.bytes.len()
    );

    let rt = tokio::runtime::Runtime::new()?;
    let save = save_only || output.is_some() || config.recording_target == RecordingTarget::Save;
    deliver(&rt, config, MediaKind::Video, recording.file, save, output)
}

/// Upload `file`, or write it locally when `save` is set
///
/// A video whose upload fails is written to the videos folder so the
/// recording is not lost.
fn deliver(
    rt: &tokio::runtime::Runtime,
    config: &Config,
    kind: MediaKind,
    file: MediaFile,
    save: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let default_dir = storage::media_dir(kind, &config.save_folder);
    if save {
        let path = rt.block_on(delivery::save_to(kind, &file, output.as_deref(), &default_dir))?;
        println!("Saved: {}", path.display());
        return Ok(());
    }

    let client = UploadClient::new(&config.server())?;
    println!("{} ({})", kind.uploading_message(), client.base_url());
    match rt.block_on(delivery::upload_or_keep(&client, kind, file, &default_dir)) {
        Ok(response) => {
            println!("{}", kind.uploaded_message());
            println!("Server response: {}", response);
            Ok(())
        }
        Err(failure) => {
            eprintln!("{}", kind.failed_message());
            if let Some(Ok(path)) = &failure.kept {
                eprintln!("Recording kept at: {}", path.display());
            }
            Err(failure.error.into())
        }
    }
}

/// Print the uploaded photos or videos, optionally opening each one
pub fn list_gallery(
    config: &Config,
    kind: GalleryKind,
    open_items: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = GalleryClient::new(&config.server())?;
    let rt = tokio::runtime::Runtime::new()?;
    let items = rt.block_on(client.fetch(kind))?;

    println!("{}:", kind.title());
    if items.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for item in &items {
        println!("  {}", item.url);
        if open_items && let Err(e) = open::that(&item.url) {
            error!(url = %item.url, error = %e, "Failed to open media");
            eprintln!("Could not open {}: {}", item.url, e);
        }
    }

    Ok(())
}
