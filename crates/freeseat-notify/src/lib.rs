//! Result artifacts and notifications for freeseat
//!
//! Implements the engine's [`Recorder`] contract: a file recorder that
//! always leaves a readable artifact on disk, plus an optional webhook.
//! Invoked by the engine at most once per run, at the terminal transition.

pub mod error;
pub mod file;
pub mod webhook;

use async_trait::async_trait;
use freeseat_core::{CoreError, InstanceSnapshot, ProviderError, Recorder};

pub use error::{NotifyError, Result};
pub use file::{FileRecorder, IMAGE_LIST_FILE, INSTANCE_CREATED_FILE, UNHANDLED_ERROR_FILE};
pub use webhook::{Notification, WebhookNotifier};

/// Fans one terminal record out to the artifact files and, when configured,
/// the webhook. Artifact failures surface to the engine (which logs them);
/// webhook failures are logged here and never surfaced — the file on disk is
/// the contract, notification is best-effort.
pub struct CompositeRecorder {
    file: FileRecorder,
    webhook: Option<WebhookNotifier>,
}

impl CompositeRecorder {
    pub fn new(file: FileRecorder, webhook: Option<WebhookNotifier>) -> Self {
        Self { file, webhook }
    }
}

#[async_trait]
impl Recorder for CompositeRecorder {
    async fn record_success(&self, instance: &InstanceSnapshot) -> freeseat_core::Result<()> {
        if let Some(ref webhook) = self.webhook {
            if let Err(err) = webhook.notify_success(Some(instance)).await {
                tracing::warn!(error = %err, "success webhook could not be delivered");
            }
        }
        self.file
            .write_instance_details(instance)
            .await
            .map_err(|err| CoreError::Recorder(err.to_string()))
    }

    async fn record_success_pending(&self) -> freeseat_core::Result<()> {
        if let Some(ref webhook) = self.webhook {
            if let Err(err) = webhook.notify_success(None).await {
                tracing::warn!(error = %err, "success webhook could not be delivered");
            }
        }
        self.file
            .write_pending_note()
            .await
            .map_err(|err| CoreError::Recorder(err.to_string()))
    }

    async fn record_failure(&self, error: &ProviderError) -> freeseat_core::Result<()> {
        if let Some(ref webhook) = self.webhook {
            if let Err(err) = webhook.notify_failure(error).await {
                tracing::warn!(error = %err, "failure webhook could not be delivered");
            }
        }
        self.file
            .write_failure(error)
            .await
            .map_err(|err| CoreError::Recorder(err.to_string()))
    }

    async fn record_image_list(&self, images: &serde_json::Value) -> freeseat_core::Result<()> {
        self.file
            .write_image_list(images)
            .await
            .map_err(|err| CoreError::Recorder(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freeseat_core::LifecycleState;

    #[tokio::test]
    async fn composite_without_webhook_writes_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CompositeRecorder::new(FileRecorder::new(dir.path()), None);

        let instance = InstanceSnapshot {
            id: "ocid1.instance.oc1..aaa".to_string(),
            display_name: "seat".to_string(),
            availability_domain: "xyz:EU-FRANKFURT-1-AD-1".to_string(),
            shape: "VM.Standard.A1.Flex".to_string(),
            lifecycle_state: LifecycleState::Running,
            time_created: None,
        };
        recorder.record_success(&instance).await.unwrap();

        let body = std::fs::read_to_string(dir.path().join(INSTANCE_CREATED_FILE)).unwrap();
        assert!(body.contains("ocid1.instance.oc1..aaa"));
    }
}
