// SPDX-License-Identifier: MPL-2.0

//! Camera discovery through the GStreamer device monitor

use super::types::CameraDevice;
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, info, warn};

/// Device properties that may carry the V4L2 node, in order of preference.
/// The v4l2 provider sets `device.path`; the PipeWire provider sets
/// `api.v4l2.path`.
const PATH_PROPERTIES: &[&str] = &["api.v4l2.path", "device.path"];

/// List available video sources
///
/// Returns an empty list (and logs) when GStreamer or the monitor fails;
/// callers decide whether "no cameras" is fatal.
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    if let Err(e) = gst::init() {
        warn!(error = %e, "GStreamer init failed, no cameras");
        return Vec::new();
    }

    let monitor = gst::DeviceMonitor::new();
    if monitor.add_filter(Some("Video/Source"), None).is_none() {
        warn!("Device monitor rejected the Video/Source filter");
    }

    if let Err(e) = monitor.start() {
        warn!(error = %e, "Device monitor failed to start");
        return Vec::new();
    }

    let mut cameras: Vec<CameraDevice> = Vec::new();
    for device in monitor.devices() {
        let name = device.display_name().to_string();
        let path = device
            .properties()
            .and_then(|props| pick_device_path(|key| props.get::<String>(key).ok()));

        debug!(name = %name, path = ?path, "Found video source");

        // PipeWire and v4l2 providers can both report the same node
        if path.is_some() && cameras.iter().any(|c| c.path == path) {
            continue;
        }
        cameras.push(CameraDevice { name, path });
    }
    monitor.stop();

    info!(count = cameras.len(), "Enumerated cameras");
    cameras
}

/// Pick the first usable device path from provider properties
pub fn pick_device_path(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    PATH_PROPERTIES
        .iter()
        .filter_map(|key| lookup(key))
        .find(|path| path.starts_with("/dev/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_prefers_pipewire_v4l2_path() {
        let props: HashMap<&str, &str> = [
            ("api.v4l2.path", "/dev/video2"),
            ("device.path", "/dev/video0"),
        ]
        .into();
        let path = pick_device_path(|key| props.get(key).map(|v| v.to_string()));
        assert_eq!(path.as_deref(), Some("/dev/video2"));
    }

    #[test]
    fn test_ignores_non_device_paths() {
        let props: HashMap<&str, &str> = [("device.path", "v4l2:/dev/video0")].into();
        assert_eq!(
            pick_device_path(|key| props.get(key).map(|v| v.to_string())),
            None
        );
    }
}
