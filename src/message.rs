use std::fmt;

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::input::ImageAttachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Ai,
}

/// Opaque message identity. The prefix keeps user, assistant and error
/// messages apart even when they are created in the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn user() -> Self {
        Self::with_prefix("user")
    }

    pub fn ai() -> Self {
        Self::with_prefix("ai")
    }

    pub fn error() -> Self {
        Self::with_prefix("error")
    }

    fn with_prefix(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local description of an image the user attached. Only used for display;
/// the bytes themselves are never kept on the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
}

impl From<&ImageAttachment> for ImageRef {
    fn from(attachment: &ImageAttachment) -> Self {
        Self {
            file_name: attachment.file_name.clone(),
            mime_type: attachment.mime_type.clone(),
            size: attachment.bytes.len() as u64,
        }
    }
}

impl ImageRef {
    pub fn describe(&self) -> String {
        format!("{} ({}, {})", self.file_name, self.mime_type, format_size(self.size))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub image: Option<ImageRef>,
    pub created_at: DateTime<Local>,
    pub loading: bool,
}

impl Message {
    pub fn user(content: String, image: Option<ImageRef>) -> Self {
        Self {
            id: MessageId::user(),
            role: Role::User,
            content,
            image,
            created_at: Local::now(),
            loading: false,
        }
    }

    /// Assistant placeholder shown while a request is outstanding.
    pub fn placeholder() -> Self {
        Self {
            id: MessageId::ai(),
            role: Role::Ai,
            content: String::new(),
            image: None,
            created_at: Local::now(),
            loading: true,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::error(),
            role: Role::Ai,
            content: content.into(),
            image: None,
            created_at: Local::now(),
            loading: false,
        }
    }

    pub fn timestamp(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} B", bytes)
    }
}
