//! # Notifications
//!
//! Fire-and-forget shopper notifications. The store hands every failure to a
//! [`NotificationSink`] exactly once and never waits on it.

use rocket_core::NoticeKind;
use std::sync::Mutex;
use tracing::warn;

/// Receives shopper-facing notices.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: NoticeKind);
}

/// Writes each notice as a `warn!` event; the CLI's sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notice: NoticeKind) {
        warn!(notice = ?notice, "{}", notice.message());
    }
}

/// Keeps every notice in order, for UIs that poll and for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<NoticeKind>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far, oldest first.
    pub fn notices(&self) -> Vec<NoticeKind> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notice: NoticeKind) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
