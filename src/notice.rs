use std::time::{Duration, Instant};

use crate::constants::NOTICE_TTL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient notification, shown until its time-to-live runs out.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub raised_at: Instant,
}

#[derive(Debug)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::with_ttl(NOTICE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            notices: Vec::new(),
            ttl,
        }
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Success, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Error, text.into());
    }

    fn push(&mut self, level: NoticeLevel, text: String) {
        tracing::debug!(?level, %text, "Raising notice");
        self.notices.push(Notice {
            level,
            text,
            raised_at: Instant::now(),
        });
    }

    /// Drops notices older than the time-to-live.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.notices
            .retain(|n| now.saturating_duration_since(n.raised_at) < ttl);
    }

    /// Newest first.
    pub fn visible(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().rev()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// Removes and returns everything raised so far.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}
