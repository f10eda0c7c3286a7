// SPDX-License-Identifier: GPL-3.0-only

//! Terminal-based capture client
//!
//! Renders the camera feed to the terminal using Unicode half-block
//! characters, takes photos, records videos and browses the server galleries.
//!
//! Network and encoding work runs on a tokio runtime; results come back to
//! the UI thread as [`TaskEvent`]s and are folded into [`CaptureState`].

pub mod state;
pub mod widgets;

pub use state::{CaptureState, GalleryState, Page, TaskEvent};

use crate::backends::camera::{
    CameraDevice, CameraFrame, CapturePipeline, CaptureFormat, FrameSender, enumerate_cameras,
    preferred_camera_index,
};
use crate::config::{Config, RecordingTarget};
use crate::constants::{BitratePreset, pipeline, timing};
use crate::gallery::{GalleryClient, GalleryKind};
use crate::pipelines::photo::PhotoPipeline;
use crate::pipelines::video::{Recording, VideoRecorder, VideoRecorderConfig};
use crate::storage;
use crate::upload::{MediaFile, MediaKind, UploadClient};
use widgets::{FrameWidget, GalleryView, NotificationBanner, StatusBar};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::channel::mpsc;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io::{self, stdout};
use std::sync::mpsc as std_mpsc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Preview resolution; high resolution isn't useful in a terminal
const PREVIEW_WIDTH: u32 = 640;
const PREVIEW_HEIGHT: u32 = 480;

/// Run the terminal capture client
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let server = config.server();
    let (events, event_receiver) = std_mpsc::channel();
    let services = Services {
        runtime: tokio::runtime::Runtime::new()?,
        uploader: UploadClient::new(&server)?,
        gallery: GalleryClient::new(&server)?,
        photo: PhotoPipeline::from_config(&config),
        target: config.recording_target,
        save_folder: config.save_folder.clone(),
        events,
    };
    info!(server = %server.base_url, "Starting terminal client");

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &config, services, event_receiver);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// What currently holds the camera
enum ActiveSource {
    Preview(CapturePipeline),
    Recording(VideoRecorder),
}

/// Background work dispatch
struct Services {
    runtime: tokio::runtime::Runtime,
    uploader: UploadClient,
    gallery: GalleryClient,
    photo: PhotoPipeline,
    target: RecordingTarget,
    save_folder: String,
    events: std_mpsc::Sender<TaskEvent>,
}

impl Services {
    fn sender(&self) -> std_mpsc::Sender<TaskEvent> {
        self.events.clone()
    }

    /// Upload or save a finished capture, depending on the configured target
    fn deliver(&self, kind: MediaKind, file: MediaFile, state: &mut CaptureState, now: Instant) {
        match self.target {
            RecordingTarget::Upload => {
                let id = match kind {
                    MediaKind::Video => state.queue_video(file.clone()),
                    MediaKind::Photo => state.next_upload_id(),
                };
                self.upload(kind, id, file, state, now);
            }
            RecordingTarget::Save => {
                let dir = storage::media_dir(kind, &self.save_folder);
                let events = self.sender();
                self.runtime.spawn(async move {
                    let result = storage::save_media(kind, &file, &dir)
                        .await
                        .map_err(|e| e.to_string());
                    let _ = events.send(TaskEvent::Saved { kind, result });
                });
            }
        }
    }

    fn upload(
        &self,
        kind: MediaKind,
        id: u64,
        file: MediaFile,
        state: &mut CaptureState,
        now: Instant,
    ) {
        state.upload_started(kind, now);
        let uploader = self.uploader.clone();
        let events = self.sender();
        self.runtime.spawn(async move {
            let result = uploader.upload(kind, file).await;
            let _ = events.send(TaskEvent::Uploaded { kind, id, result });
        });
    }

    /// Drain the recorder off the UI thread; the camera is free once
    /// [`TaskEvent::RecordingFinished`] arrives
    fn finish_recording(&self, recorder: VideoRecorder) {
        let events = self.sender();
        self.runtime.spawn_blocking(move || {
            let result = recorder.stop();
            let _ = events.send(TaskEvent::RecordingFinished { result });
        });
    }

    /// Encode the newest frame off the UI thread, then deliver it
    fn take_photo(&self, frame: Option<CameraFrame>, state: &mut CaptureState, now: Instant) {
        if frame.is_none() {
            state.notify("No frame available yet", now);
            return;
        }
        if self.target == RecordingTarget::Upload {
            state.upload_started(MediaKind::Photo, now);
        }

        let id = state.next_upload_id();
        let photo = self.photo;
        let target = self.target;
        let uploader = self.uploader.clone();
        let dir = storage::photo_dir(&self.save_folder);
        let events = self.sender();
        self.runtime.spawn(async move {
            let file = match photo.capture(frame.as_ref()).await {
                Ok(file) => file,
                Err(e) => {
                    let _ = events.send(TaskEvent::CaptureFailed {
                        kind: MediaKind::Photo,
                        message: e.to_string(),
                    });
                    return;
                }
            };
            let event = match target {
                RecordingTarget::Upload => TaskEvent::Uploaded {
                    kind: MediaKind::Photo,
                    id,
                    result: uploader.upload_photo(file).await,
                },
                RecordingTarget::Save => TaskEvent::Saved {
                    kind: MediaKind::Photo,
                    result: storage::save_media(MediaKind::Photo, &file, &dir)
                        .await
                        .map_err(|e| e.to_string()),
                },
            };
            let _ = events.send(event);
        });
    }

    fn fetch_gallery(&self, kind: GalleryKind) {
        let client = self.gallery.clone();
        let events = self.sender();
        self.runtime.spawn(async move {
            let result = client.fetch(kind).await;
            let _ = events.send(TaskEvent::GalleryLoaded { kind, result });
        });
    }
}

struct App {
    services: Services,
    state: CaptureState,
    cameras: Vec<CameraDevice>,
    camera_index: usize,
    format: CaptureFormat,
    bitrate: BitratePreset,
    frame_sender: FrameSender,
    source: Option<ActiveSource>,
    frame_widget: FrameWidget,
}

impl App {
    fn device(&self) -> Option<&CameraDevice> {
        self.cameras.get(self.camera_index)
    }

    fn start_preview(&mut self, now: Instant) {
        match CapturePipeline::new(self.device(), &self.format, self.frame_sender.clone()) {
            Ok(capture) => self.source = Some(ActiveSource::Preview(capture)),
            Err(e) => {
                error!(error = %e, "Error accessing camera");
                self.source = None;
                self.state.notify(format!("Error accessing camera: {}", e), now);
            }
        }
    }

    /// Drop a preview whose pipeline reported an error
    fn check_capture_errors(&mut self, now: Instant) {
        let failed = match &self.source {
            Some(ActiveSource::Preview(capture)) => capture.poll_error(),
            _ => None,
        };
        if let Some(e) = failed {
            self.source = None;
            self.state.notify(format!("Camera error: {}", e), now);
        }
    }

    fn toggle_recording(&mut self, now: Instant) {
        if self.state.is_recording() {
            self.stop_recording(now);
        } else {
            self.start_recording(now);
        }
    }

    fn start_recording(&mut self, now: Instant) {
        if let Err(e) = self.state.begin_recording(now) {
            self.state.notify(e.to_string(), now);
            return;
        }

        // The recorder opens the camera itself
        self.source = None;

        let config = VideoRecorderConfig {
            device: self.device(),
            format: self.format,
            bitrate: self.bitrate,
            preview_sender: Some(self.frame_sender.clone()),
        };
        let result = VideoRecorder::new(config).and_then(|mut recorder| {
            recorder.start()?;
            Ok(recorder)
        });

        match result {
            Ok(recorder) => {
                info!("Recording started");
                self.source = Some(ActiveSource::Recording(recorder));
            }
            Err(e) => {
                error!(error = %e, "Failed to start recording");
                let _ = self.state.finish_recording(now);
                self.state.notify(format!("Error: {}", e), now);
                self.start_preview(now);
            }
        }
    }

    fn stop_recording(&mut self, now: Instant) {
        let elapsed = match self.state.finish_recording(now) {
            Ok(secs) => secs,
            Err(e) => {
                self.state.notify(e.to_string(), now);
                return;
            }
        };

        let Some(ActiveSource::Recording(recorder)) = self.source.take() else {
            warn!("Recording timer was running without a recorder");
            self.start_preview(now);
            return;
        };

        info!(secs = elapsed, "Recording stopped, draining");
        self.state.finishing_recording = true;
        self.state.notify("Finishing recording...", now);
        self.services.finish_recording(recorder);
    }

    /// The recorder has released the camera
    fn recording_finished(&mut self, recording: Recording, now: Instant) {
        info!(
            bytes = recording.file.bytes.len(),
            chunks = recording.chunk_count,
            "Recording assembled"
        );
        self.start_preview(now);
        self.services
            .deliver(MediaKind::Video, recording.file, &mut self.state, now);
    }

    fn switch_camera(&mut self, now: Instant) {
        if !self.state.multi_camera {
            return;
        }
        if self.state.is_recording() || self.state.finishing_recording {
            self.state.notify("Stop recording before switching cameras", now);
            return;
        }

        self.camera_index = (self.camera_index + 1) % self.cameras.len();
        info!(camera = ?self.device().map(|d| d.name.as_str()), "Switching camera");

        // Release the old device before opening the next one
        self.source = None;
        self.frame_widget.reset();
        self.start_preview(now);
    }

    fn open_gallery(&mut self, kind: GalleryKind, now: Instant) {
        if self.state.is_recording() {
            self.state.notify("Stop recording before opening the gallery", now);
            return;
        }
        self.state.open_gallery(kind);
        self.services.fetch_gallery(kind);
    }

    /// Returns true when the app should quit
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if key.code == KeyCode::Char('q') {
            return true;
        }

        match self.state.page {
            Page::Camera => self.handle_camera_key(key.code, now),
            Page::Gallery(kind) => self.handle_gallery_key(kind, key.code, now),
        }
        false
    }

    fn handle_camera_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Char('p') => {
                self.state.show_help = false;
                let frame = self.frame_widget.frame.clone();
                self.services.take_photo(frame, &mut self.state, now);
            }
            KeyCode::Char('r') => {
                self.state.show_help = false;
                self.toggle_recording(now);
            }
            KeyCode::Char('u') => {
                let retries = self.state.take_retries();
                if retries.is_empty() && !self.state.pending_videos.is_empty() {
                    self.state.notify("Upload already in progress", now);
                }
                for (id, file) in retries {
                    self.services
                        .upload(MediaKind::Video, id, file, &mut self.state, now);
                }
            }
            KeyCode::Char('s') => {
                self.state.show_help = false;
                self.switch_camera(now);
            }
            KeyCode::Char('g') => self.open_gallery(GalleryKind::Photos, now),
            KeyCode::Char('v') => self.open_gallery(GalleryKind::Videos, now),
            KeyCode::Char('h') => self.state.toggle_help(),
            _ => {}
        }
    }

    fn handle_gallery_key(&mut self, kind: GalleryKind, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Esc | KeyCode::Char('b') => self.state.back_to_camera(),
            KeyCode::Char('r') => {
                self.state.open_gallery(kind);
                self.services.fetch_gallery(kind);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(gallery) = self.state.gallery.as_mut() {
                    gallery.select_previous();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(gallery) = self.state.gallery.as_mut() {
                    gallery.select_next();
                }
            }
            KeyCode::Enter => {
                let url = self
                    .state
                    .gallery
                    .as_ref()
                    .and_then(|g| g.selected_item())
                    .map(|item| item.url.clone());
                if let Some(url) = url {
                    info!(url = %url, "Opening media");
                    if let Err(e) = open::that(&url) {
                        error!(url = %url, error = %e, "Failed to open media");
                        self.state.notify(format!("Could not open {}: {}", url, e), now);
                    }
                }
            }
            _ => {}
        }
    }

    fn draw(&self, f: &mut ratatui::Frame, now: Instant) {
        let area = f.area();

        // Reserve bottom line for status
        let main_area = Rect {
            height: area.height.saturating_sub(1),
            ..area
        };
        match (self.state.page, &self.state.gallery) {
            (Page::Gallery(_), Some(gallery)) => f.render_widget(GalleryView { gallery }, main_area),
            _ => f.render_widget(&self.frame_widget, main_area),
        }

        let status_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(1),
            width: area.width,
            height: 1.min(area.height),
        };
        let message = self.state.status_line(now);
        f.render_widget(
            StatusBar {
                message: &message,
                recording: self.state.is_recording(),
            },
            status_area,
        );

        if let Some(message) = self.state.notification.current(now) {
            f.render_widget(NotificationBanner { message }, main_area);
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
    services: Services,
    events: std_mpsc::Receiver<TaskEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let cameras = enumerate_cameras();
    if cameras.is_empty() {
        warn!("No cameras enumerated, falling back to the default source");
    } else {
        info!(count = cameras.len(), "Found cameras");
    }

    let camera_index = preferred_camera_index(&cameras, config.camera_path.as_deref());
    let (frame_sender, mut frame_receiver) = mpsc::channel(pipeline::FRAME_CHANNEL_CAPACITY);

    let mut app = App {
        services,
        state: CaptureState::new(config.notification_timeout(), cameras.len() > 1),
        cameras,
        camera_index,
        format: CaptureFormat::new(PREVIEW_WIDTH, PREVIEW_HEIGHT),
        bitrate: config.bitrate_preset,
        frame_sender,
        source: None,
        frame_widget: FrameWidget::new(config.mirror_preview),
    };
    app.start_preview(Instant::now());

    loop {
        // Drain all available frames to get latest
        while let Ok(frame) = frame_receiver.try_recv() {
            app.frame_widget.update_frame(frame);
        }
        while let Ok(event) = events.try_recv() {
            let now = Instant::now();
            if let Some(recording) = app.state.apply(event, now) {
                app.recording_finished(recording, now);
            }
        }
        app.check_capture_errors(Instant::now());

        let now = Instant::now();
        terminal.draw(|f| app.draw(f, now))?;

        if event::poll(timing::UI_POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && app.handle_key(key, Instant::now())
        {
            break;
        }
    }

    if matches!(app.source, Some(ActiveSource::Recording(_))) {
        warn!("Quitting while recording, recording discarded");
    }
    keep_unsent_recordings(&mut app, &events);
    Ok(())
}

/// Write recordings that never reached the server to the videos folder
fn keep_unsent_recordings(app: &mut App, events: &std_mpsc::Receiver<TaskEvent>) {
    let mut unsent: Vec<MediaFile> = app
        .state
        .pending_videos
        .drain(..)
        .map(|video| video.file)
        .collect();

    if app.state.finishing_recording {
        let wait = Duration::from_secs(timing::EOS_TIMEOUT_SECS + 1);
        let deadline = Instant::now() + wait;
        while let Some(left) = deadline.checked_duration_since(Instant::now()) {
            match events.recv_timeout(left) {
                Ok(TaskEvent::RecordingFinished { result: Ok(recording) }) => {
                    unsent.push(recording.file);
                    break;
                }
                Ok(TaskEvent::RecordingFinished { result: Err(e) }) => {
                    error!(error = %e, "Failed to stop recording");
                    break;
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    }

    let dir = storage::video_dir(&app.services.save_folder);
    for file in unsent {
        match app
            .services
            .runtime
            .block_on(storage::save_media(MediaKind::Video, &file, &dir))
        {
            Ok(path) => warn!(path = %path.display(), "Recording was not uploaded, kept locally"),
            Err(e) => error!(error = %e, "Could not keep recording that was not uploaded"),
        }
    }
}
