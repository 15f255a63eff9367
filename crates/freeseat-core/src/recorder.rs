//! Recorder/notifier collaborator contract
//!
//! Invoked by the engine at most once per run, at the terminal transition.
//! The engine logs recorder failures and never lets them override the run
//! outcome being reported.

use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::model::InstanceSnapshot;

#[async_trait]
pub trait Recorder: Send + Sync {
    /// A satisfying instance exists (freshly launched or pre-existing)
    async fn record_success(&self, instance: &InstanceSnapshot) -> Result<()>;

    /// A launch was accepted but the instance listing has not caught up yet
    async fn record_success_pending(&self) -> Result<()>;

    /// The run ended on an unrecoverable error
    async fn record_failure(&self, error: &ProviderError) -> Result<()>;

    /// The filtered image candidates gathered during resolution
    async fn record_image_list(&self, images: &serde_json::Value) -> Result<()>;
}

/// Recorder that drops everything, for runs that only probe
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

#[async_trait]
impl Recorder for NullRecorder {
    async fn record_success(&self, _instance: &InstanceSnapshot) -> Result<()> {
        Ok(())
    }

    async fn record_success_pending(&self) -> Result<()> {
        Ok(())
    }

    async fn record_failure(&self, _error: &ProviderError) -> Result<()> {
        Ok(())
    }

    async fn record_image_list(&self, _images: &serde_json::Value) -> Result<()> {
        Ok(())
    }
}
