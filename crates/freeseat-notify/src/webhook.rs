//! Webhook notification
//!
//! Optional JSON POST of the terminal outcome. Delivery is best-effort: the
//! caller logs failures and never lets them override the run outcome.

use chrono::{DateTime, Utc};
use freeseat_core::{InstanceSnapshot, ProviderError};
use serde::Serialize;

use crate::error::{NotifyError, Result};

/// Outcome payload delivered to the webhook
#[derive(Debug, Serialize)]
pub struct Notification<'a> {
    pub event: &'static str,
    pub sent_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<&'a InstanceSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a ProviderError>,
}

/// Posts terminal outcomes to a configured URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub async fn notify_success(&self, instance: Option<&InstanceSnapshot>) -> Result<()> {
        self.post(Notification {
            event: "instance-created",
            sent_at: Utc::now(),
            instance,
            error: None,
        })
        .await
    }

    pub async fn notify_failure(&self, error: &ProviderError) -> Result<()> {
        self.post(Notification {
            event: "acquisition-failed",
            sent_at: Utc::now(),
            instance: None,
            error: Some(error),
        })
        .await
    }

    async fn post(&self, notification: Notification<'_>) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&notification)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::WebhookStatus(status.as_u16()));
        }
        tracing::debug!(event = notification.event, "webhook delivered");
        Ok(())
    }
}
