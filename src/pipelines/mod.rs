// SPDX-License-Identifier: MPL-2.0

//! Capture pipelines
//!
//! - [`photo`]: snapshot extraction and image encoding
//! - [`video`]: in-memory WebM recording

pub mod photo;
pub mod video;
