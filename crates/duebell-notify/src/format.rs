//! Task → NotificationPayload.

use duebell_core::{NotificationExtras, NotificationPayload, Task};
use thiserror::Error;

/// Label appended to every notification title.
pub const SOURCE_LABEL: &str = "Notion";

/// Urgency derived from the status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    DueToday,
    Overdue,
}

impl Urgency {
    /// Substring test, not a parse: any status mentioning "today" is due today.
    pub fn from_status(status: &str) -> Self {
        if status.contains("today") {
            Self::DueToday
        } else {
            Self::Overdue
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::DueToday => "👍",
            Self::Overdue => "💀",
        }
    }

    /// Gotify priority; overdue is one step louder.
    pub fn priority(self) -> u8 {
        match self {
            Self::DueToday => 5,
            Self::Overdue => 6,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("task '{title}' has no status")]
    MissingStatus { title: String },
}

/// Builds payloads, attaching the backlink when one is configured.
#[derive(Debug, Clone, Default)]
pub struct NotificationFormatter {
    backlink: Option<String>,
}

impl NotificationFormatter {
    pub fn new(backlink: Option<String>) -> Self {
        Self { backlink }
    }

    pub fn format(&self, task: &Task) -> Result<NotificationPayload, FormatError> {
        let (status, urgency) = classify(task)?;
        Ok(NotificationPayload {
            title: format!("{} {} ({SOURCE_LABEL})", urgency.glyph(), task.display_title()),
            message: status.to_string(),
            priority: urgency.priority(),
            extras: self.backlink.as_deref().map(NotificationExtras::click_url),
        })
    }

    /// `"<glyph> <title>"`, as printed to the console in immediate mode.
    pub fn console_line(task: &Task) -> Result<String, FormatError> {
        let (_, urgency) = classify(task)?;
        Ok(format!("{} {}", urgency.glyph(), task.display_title()))
    }
}

fn classify(task: &Task) -> Result<(&str, Urgency), FormatError> {
    let status = task.status.as_deref().ok_or_else(|| FormatError::MissingStatus {
        title: task.display_title().to_string(),
    })?;
    Ok((status, Urgency::from_status(status)))
}
