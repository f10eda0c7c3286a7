// SPDX-License-Identifier: MPL-2.0

//! Camera Upload - a webcam capture client for an HTTP media server
//!
//! Opens a local camera, shows a live preview, takes photos and records short
//! videos, and uploads the results to a remote server. The server also lists
//! previously uploaded media, which the gallery views display.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Camera enumeration and the live capture pipeline
//! - [`pipelines`]: Snapshot extraction/encoding and video recording
//! - [`upload`]: Multipart uploads to the media server
//! - [`gallery`]: Listings of uploaded photos and videos
//! - [`notification`]: Timed notification banner
//! - [`terminal`]: Interactive terminal front end
//! - [`config`]: User configuration handling
//! - [`storage`]: Local file storage for media that is not uploaded
//! - [`delivery`]: Upload-or-save for the one-shot commands
//!
//! # Example
//!
//! ```ignore
//! // Interactive capture in the terminal:
//! // camera-upload
//! // One-shot photo upload:
//! // camera-upload photo
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod delivery;
pub mod errors;
pub mod gallery;
pub mod notification;
pub mod pipelines;
pub mod storage;
pub mod terminal;
pub mod upload;

// Re-export commonly used types
pub use config::Config;
pub use constants::BitratePreset;
pub use errors::{AppError, AppResult};
pub use gallery::{GalleryClient, GalleryItem, GalleryKind};
pub use upload::{MediaFile, MediaKind, UploadClient, UploadResponse};
