//! Notification dispatch — sends payloads to a Gotify server.
//! Fire-and-forget: no retry, no queue. Every problem comes back as
//! `DispatchOutcome::Failed` for the caller to log.

use async_trait::async_trait;
use duebell_core::{DispatchFailure, DispatchOutcome, GotifySettings, NotificationPayload, NotificationSink};

#[derive(Debug, Clone)]
struct GotifyEndpoint {
    message_url: String,
    token: String,
}

/// Gotify dispatcher. Without an endpoint every send is a no-op.
#[derive(Debug, Clone)]
pub struct GotifyDispatcher {
    client: reqwest::Client,
    endpoint: Option<GotifyEndpoint>,
}

/// `{base}/message`, dropping one trailing slash from `base`.
pub fn message_url(base: &str) -> String {
    format!("{}/message", base.strip_suffix('/').unwrap_or(base))
}

impl GotifyDispatcher {
    pub fn new(settings: Option<&GotifySettings>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: settings.map(|s| GotifyEndpoint {
                message_url: message_url(&s.url),
                token: s.token.clone(),
            }),
        }
    }

    /// A dispatcher that never sends anything.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// POST the payload as JSON to `{url}/message?token={token}`.
    pub async fn dispatch(&self, payload: &NotificationPayload) -> DispatchOutcome {
        let Some(endpoint) = &self.endpoint else {
            return DispatchOutcome::Skipped;
        };

        let response = self
            .client
            .post(&endpoint.message_url)
            .query(&[("token", endpoint.token.as_str())])
            .json(payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!("Gotify notification sent: {}", payload.title);
                DispatchOutcome::Delivered
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                DispatchOutcome::Failed(DispatchFailure {
                    status: Some(status.as_u16()),
                    detail: if body.is_empty() { status.to_string() } else { body },
                })
            }
            Err(e) => DispatchOutcome::Failed(DispatchFailure {
                status: None,
                detail: format!("Gotify send failed: {e}"),
            }),
        }
    }
}

#[async_trait]
impl NotificationSink for GotifyDispatcher {
    async fn send(&self, payload: &NotificationPayload) -> DispatchOutcome {
        self.dispatch(payload).await
    }
}
