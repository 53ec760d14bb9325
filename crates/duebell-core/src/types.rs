//! Transient data model — one poll produces Tasks, each Task one payload.

use serde::{Deserialize, Serialize};

/// A due or overdue item read from the task database.
///
/// Both fields are optional: a record with a missing or malformed property
/// still produces a Task, it just carries `None` for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub title: Option<String>,
    pub status: Option<String>,
}

impl Task {
    pub fn new(title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            status: Some(status.into()),
        }
    }

    /// Title for display, empty when the source record had none.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// Body of a Gotify `POST /message` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub message: String,
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<NotificationExtras>,
}

/// Gotify client metadata. Only the click-through URL is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationExtras {
    #[serde(rename = "client::notification")]
    pub client_notification: ClientNotification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientNotification {
    pub click: ClickAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickAction {
    pub url: String,
}

impl NotificationExtras {
    /// Extras that open `url` when the notification is tapped.
    pub fn click_url(url: impl Into<String>) -> Self {
        Self {
            client_notification: ClientNotification {
                click: ClickAction { url: url.into() },
            },
        }
    }

    pub fn url(&self) -> &str {
        &self.client_notification.click.url
    }
}

/// Result of handing one payload to a [`NotificationSink`](crate::traits::NotificationSink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The endpoint accepted the notification.
    Delivered,
    /// No endpoint is configured; nothing was sent.
    Skipped,
    /// Transport error or non-success response.
    Failed(DispatchFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Response body if there was one, otherwise the transport error.
    pub detail: String,
}

impl std::fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.detail),
            None => f.write_str(&self.detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_without_extras_omits_field() {
        let payload = NotificationPayload {
            title: "👍 Dishes (Notion)".into(),
            message: "Due today".into(),
            priority: 5,
            extras: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "👍 Dishes (Notion)",
                "message": "Due today",
                "priority": 5
            })
        );
    }

    #[test]
    fn test_extras_shape() {
        let extras = NotificationExtras::click_url("https://notion.so/chores");
        let json = serde_json::to_value(&extras).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "client::notification": { "click": { "url": "https://notion.so/chores" } }
            })
        );
        assert_eq!(extras.url(), "https://notion.so/chores");
    }

    #[test]
    fn test_display_title_defaults_to_empty() {
        let task = Task {
            title: None,
            status: Some("Due today".into()),
        };
        assert_eq!(task.display_title(), "");
    }
}
