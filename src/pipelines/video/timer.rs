// SPDX-License-Identifier: MPL-2.0

//! Recording elapsed-time display

use std::time::Instant;

/// Elapsed whole seconds of the current (or last) recording
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordingTimer {
    started_at: Option<Instant>,
    frozen_secs: u64,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to zero and start counting from `now`
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.frozen_secs = 0;
    }

    /// Stop counting; the elapsed value stays readable
    pub fn stop(&mut self, now: Instant) -> u64 {
        self.frozen_secs = self.elapsed_secs(now);
        self.started_at = None;
        self.frozen_secs
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        match self.started_at {
            Some(start) => now.saturating_duration_since(start).as_secs(),
            None => self.frozen_secs,
        }
    }
}

/// `m:ss` with unpadded minutes
pub fn format_time(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
