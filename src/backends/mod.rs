// SPDX-License-Identifier: MPL-2.0

//! Capture backends

pub mod camera;
