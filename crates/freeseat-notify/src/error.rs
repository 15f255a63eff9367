//! Notifier error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("webhook delivery failed: {0}")]
    Webhook(#[from] reqwest::Error),

    #[error("webhook rejected the notification: HTTP {0}")]
    WebhookStatus(u16),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
