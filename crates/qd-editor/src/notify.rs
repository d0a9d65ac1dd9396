//! User-facing notices (toasts).
//!
//! The composer queues notices; the host drains and displays them.

use std::collections::VecDeque;

pub const WELCOME_TITLE: &str = "Welcome to Quote Dreamer!";
pub const WELCOME_DESCRIPTION: &str =
    "Create beautiful book quotes by dragging text to position it perfectly.";
pub const RESET_DONE: &str = "Quote position reset";
pub const EXPORT_DONE: &str = "Image downloaded successfully!";
pub const EXPORT_FAILED: &str = "Failed to download image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: Option<String>,
}

impl Notice {
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            description: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            ..Self::info(title)
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            ..Self::info(title)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// FIFO queue of pending notices.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
}

impl Notices {
    pub fn push(&mut self, notice: Notice) {
        log::debug!("notice [{}] {}", notice.level.as_str(), notice.title);
        self.queue.push_back(notice);
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
