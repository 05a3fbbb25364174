//! User-facing notification sinks.

use std::sync::Mutex;
use tracing::{info, warn};

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, is_error: bool);
}

/// Writes notices to stderr and mirrors them as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, is_error: bool) {
        if is_error {
            warn!(notice = message, "gate error");
            eprintln!("✗ {message}");
        } else {
            info!(notice = message, "gate notice");
            eprintln!("✓ {message}");
        }
    }
}

/// A notice captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNotice {
    pub message: String,
    pub is_error: bool,
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<RecordedNotice>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<RecordedNotice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    /// Messages of the error notices received so far.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|notice| notice.is_error)
            .map(|notice| notice.message)
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str, is_error: bool) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(RecordedNotice {
                message: message.to_string(),
                is_error,
            });
        }
    }
}
