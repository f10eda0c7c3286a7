// SPDX-License-Identifier: MPL-2.0

//! Timed notification banner

use std::time::{Duration, Instant};

/// A single message that hides itself after `timeout`
///
/// Showing a new message replaces the old one and restarts the timeout.
#[derive(Debug, Clone)]
pub struct Notification {
    message: Option<(String, Instant)>,
    timeout: Duration,
}

impl Notification {
    pub fn new(timeout: Duration) -> Self {
        Self {
            message: None,
            timeout,
        }
    }

    pub fn show(&mut self, text: impl Into<String>, now: Instant) {
        self.message = Some((text.into(), now));
    }

    /// The message, if it has not expired at `now`
    pub fn current(&self, now: Instant) -> Option<&str> {
        let (text, shown_at) = self.message.as_ref()?;
        (now.saturating_duration_since(*shown_at) < self.timeout).then_some(text.as_str())
    }

    pub fn clear(&mut self) {
        self.message = None;
    }
}

impl Default for Notification {
    fn default() -> Self {
        Self::new(Duration::from_secs(
            crate::constants::timing::NOTIFICATION_TIMEOUT_SECS,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_after_timeout() {
        let t0 = Instant::now();
        let mut n = Notification::default();
        assert_eq!(n.current(t0), None);

        n.show("Video uploaded successfully!", t0);
        assert_eq!(
            n.current(t0 + Duration::from_millis(2999)),
            Some("Video uploaded successfully!")
        );
        assert_eq!(n.current(t0 + Duration::from_secs(3)), None);
    }

    #[test]
    fn test_newer_message_restarts_timeout() {
        let t0 = Instant::now();
        let mut n = Notification::new(Duration::from_secs(3));
        n.show("Uploading video...", t0);
        n.show("Video uploaded successfully!", t0 + Duration::from_secs(2));
        assert_eq!(
            n.current(t0 + Duration::from_secs(4)),
            Some("Video uploaded successfully!")
        );
    }

    #[test]
    fn test_clear() {
        let t0 = Instant::now();
        let mut n = Notification::default();
        n.show("x", t0);
        n.clear();
        assert_eq!(n.current(t0), None);
    }
}
