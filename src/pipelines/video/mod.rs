// SPDX-License-Identifier: MPL-2.0

//! Video recording
//!
//! - [`recorder`]: GStreamer pipeline muxing VP8 into WebM chunks
//! - [`chunks`]: in-memory chunk buffer joined into one file on stop
//! - [`timer`]: elapsed time shown while recording

pub mod chunks;
pub mod recorder;
pub mod timer;

pub use crate::config::RecordingTarget;
pub use chunks::RecordedChunks;
pub use recorder::{Recording, VideoRecorder, VideoRecorderConfig};
pub use timer::{RecordingTimer, format_time};
