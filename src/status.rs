//! Short-lived status messages.
//!
//! A status is a value: text plus an optional expiry instant. Whether it is
//! still shown is decided by `is_current(now)` at projection time, so a newer
//! status set before an older one expires simply replaces it.

use std::time::{Duration, Instant};

/// Shown while an export call is in flight.
pub const EXPORT_PENDING: &str = "Opening save dialog...";

/// Shown when an export call fails.
pub const EXPORT_FAILED: &str = "Export failed!";

/// A notification shown outside the main list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientStatus {
    text: String,
    expires_at: Option<Instant>,
}

impl TransientStatus {
    /// A status that stays until replaced or cleared.
    pub fn sticky(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expires_at: None,
        }
    }

    /// A status that stops being current once `ttl` has elapsed after `now`.
    pub fn expiring(text: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            expires_at: Some(now + ttl),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// True until the expiry instant is reached.
    pub fn is_current(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(at) => now < at,
            None => true,
        }
    }
}

/// The status text for a successful export of `path`.
pub fn saved_message(path: &str) -> String {
    format!("Saved as {}", export_filename(path))
}

/// Last `/`-separated segment of `path`, or the whole path if that segment is empty.
pub fn export_filename(path: &str) -> &str {
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => path,
    }
}
