//! Transient user-facing notices.
//!
//! A single-slot queue: at most one notice is visible at a time, a newer
//! notice replaces the current one, and each posted notice carries a token
//! so the poster (or the presentation layer) can dismiss exactly the notice
//! it posted without racing a replacement.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A short-lived message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Success,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }
}

/// Opaque handle identifying one posted notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeToken(u64);

struct Slot {
    notice: Notice,
    token: NoticeToken,
    expires_at: Instant,
}

/// Single-slot notice holder with explicit expiry.
///
/// Replaces the ambient "global message + timer" pattern: there is no
/// background task, expiry is evaluated lazily on read.
pub struct NoticeQueue {
    slot: Mutex<Option<Slot>>,
    next_token: Mutex<u64>,
    ttl: Duration,
}

impl NoticeQueue {
    /// Default visibility window for a notice.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(4);

    pub fn new() -> Self {
        Self::with_ttl(Self::DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            next_token: Mutex::new(0),
            ttl,
        }
    }

    /// Post a notice, replacing whatever is currently shown.
    pub fn post(&self, notice: Notice) -> NoticeToken {
        let token = {
            let mut counter = self.next_token.lock().unwrap_or_else(|e| e.into_inner());
            *counter += 1;
            NoticeToken(*counter)
        };
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Slot {
            notice,
            token,
            expires_at: Instant::now() + self.ttl,
        });
        token
    }

    /// Dismiss the notice identified by `token`.
    ///
    /// A stale token (the notice was already replaced) is a no-op, so a
    /// delayed dismissal never hides someone else's message.
    pub fn dismiss(&self, token: NoticeToken) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.as_ref().is_some_and(|s| s.token == token) {
            *slot = None;
        }
    }

    /// The currently visible notice, if any and not yet expired.
    pub fn current(&self) -> Option<Notice> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(s) if Instant::now() < s.expires_at => Some(s.notice.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::new()
    }
}
