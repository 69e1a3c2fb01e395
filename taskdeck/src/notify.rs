//! Transient user notices with per-level time-to-live.
//!
//! Mutations and session events report outcomes here; the notice list
//! is pruned on read, so expiry needs no background task. Timing uses
//! [`tokio::time::Instant`] and honors a paused test clock.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// How long success notices stay visible.
pub const DEFAULT_SUCCESS_TTL: Duration = Duration::from_secs(3);

/// How long error notices stay visible.
pub const DEFAULT_ERROR_TTL: Duration = Duration::from_secs(5);

/// Visual severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// One visible notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Monotonic identifier, higher means newer.
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    expires_at: Instant,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<Notice>,
}

/// Collects notices and drops them when their time-to-live runs out.
pub struct Notifier {
    inner: Mutex<Inner>,
    success_ttl: Duration,
    error_ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_TTL, DEFAULT_ERROR_TTL)
    }
}

impl Notifier {
    /// Creates a notifier with explicit time-to-live values.
    #[must_use]
    pub const fn new(success_ttl: Duration, error_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 0,
                entries: Vec::new(),
            }),
            success_ttl,
            error_ttl,
        }
    }

    /// Posts a success notice, returning its id.
    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Success, message.into(), self.success_ttl)
    }

    /// Posts an error notice, returning its id. Errors stay visible
    /// longer than successes.
    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message.into(), self.error_ttl)
    }

    /// Posts an informational notice with the success time-to-live.
    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message.into(), self.success_ttl)
    }

    /// Returns the notices still alive, oldest first, pruning the rest.
    pub fn active(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        inner.entries.retain(|notice| notice.expires_at > now);
        inner.entries.clone()
    }

    fn push(&self, level: NoticeLevel, message: String, ttl: Duration) -> u64 {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Notice {
            id,
            level,
            message,
            expires_at: Instant::now() + ttl,
        });
        tracing::debug!(id, ?level, "posted notice");
        id
    }
}
