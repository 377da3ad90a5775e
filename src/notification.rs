//! Modal notices shown on top of the page until dismissed

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn title(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "Info",
            NoticeLevel::Warning => "Search",
            NoticeLevel::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

/// Notices waiting to be acknowledged, oldest first
#[derive(Debug, Default)]
pub struct NoticeQueue {
    notices: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notice::new(message, NoticeLevel::Info));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Notice::new(message, NoticeLevel::Warning));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notice::new(message, NoticeLevel::Error));
    }

    /// The notice currently on screen
    pub fn current(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_current(&mut self) -> bool {
        self.notices.pop_front().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }
}
