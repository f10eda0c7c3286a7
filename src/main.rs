// SPDX-License-Identifier: GPL-3.0-only

use camera_upload::config::Config;
use camera_upload::gallery::GalleryKind;
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "camera-upload")]
#[command(about = "Capture photos and videos from a webcam and upload them to a media server")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Media server base URL (overrides config and CAMERA_UPLOAD_SERVER)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run in terminal mode (default)
    Terminal,

    /// List available cameras
    List,

    /// Take a photo and upload it
    Photo {
        /// Camera index to use (from 'camera-upload list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Save locally instead of uploading
        #[arg(long)]
        save_only: bool,

        /// Output file or directory (implies --save-only)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Record a video and upload it
    Video {
        /// Camera index to use (from 'camera-upload list')
        #[arg(short, long)]
        camera: Option<usize>,

        /// Recording duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,

        /// Save locally instead of uploading
        #[arg(long)]
        save_only: bool,

        /// Output file or directory (implies --save-only)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List uploaded photos
    Photos {
        /// Open each photo with the system viewer
        #[arg(long)]
        open: bool,
    },

    /// List uploaded videos
    Videos {
        /// Open each video with the system player
        #[arg(long)]
        open: bool,
    },
}

/// Set up tracing
///
/// Set RUST_LOG to control the level (e.g. RUST_LOG=debug,
/// RUST_LOG=camera_upload=info). The terminal UI owns the screen, so it logs
/// to a file in the cache directory instead of stderr.
fn init_logging(to_file: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    if !to_file {
        subscriber.with_writer(std::io::stderr).init();
        return;
    }

    let log_file = dirs::cache_dir()
        .map(|dir| dir.join("camera-upload"))
        .and_then(|dir| {
            std::fs::create_dir_all(&dir).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("camera-upload.log"))
                .ok()
        });

    match log_file {
        Some(file) => subscriber
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => subscriber.with_writer(std::io::sink).init(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let terminal_mode = matches!(cli.command, None | Some(Commands::Terminal));
    init_logging(terminal_mode);

    let config = Config::load()?.with_server_override(cli.server);

    match cli.command {
        None | Some(Commands::Terminal) => camera_upload::terminal::run(config),
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Photo {
            camera,
            save_only,
            output,
        }) => cli::take_photo(&config, camera, save_only, output),
        Some(Commands::Video {
            camera,
            duration,
            save_only,
            output,
        }) => cli::record_video(&config, camera, duration, save_only, output),
        Some(Commands::Photos { open }) => cli::list_gallery(&config, GalleryKind::Photos, open),
        Some(Commands::Videos { open }) => cli::list_gallery(&config, GalleryKind::Videos, open),
    }
}
