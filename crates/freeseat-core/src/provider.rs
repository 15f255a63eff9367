//! Seams between the engine and its collaborators
//!
//! The engine only ever talks to the provider, the resolver, the recorder
//! and the clock through these traits, so tests script all of them.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::{AcquisitionTarget, InstanceSnapshot};
use crate::recorder::Recorder;

/// Compute operations consumed by the engine
///
/// Implementations own error classification and back-off: by the time a
/// call returns here, every failure is a classified [`ProviderError`] and
/// any retryable back-off sleep has already happened.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// List all instances in a compartment.
    ///
    /// Retryable failures are absorbed inside the provider (retried until
    /// they stop); an `Err` from this method ends the run.
    async fn list_instances(
        &self,
        compartment_id: &str,
    ) -> Result<Vec<InstanceSnapshot>, ProviderError>;

    /// One launch attempt into the given availability domain.
    ///
    /// A retryable error has already slept the fixed back-off before it is
    /// returned; the caller only decides whether to loop.
    async fn launch(
        &self,
        target: &AcquisitionTarget,
        availability_domain: &str,
    ) -> Result<(), ProviderError>;
}

/// One-shot resolution of configuration into a launchable target
#[async_trait]
pub trait TargetResolver: Send + Sync {
    /// Resolve tenancy, availability domains, subnet and image into an
    /// [`AcquisitionTarget`]. The recorder receives the filtered image list
    /// gathered along the way. Resolution failures are always fatal.
    async fn resolve(&self, recorder: &dyn Recorder) -> Result<AcquisitionTarget, ProviderError>;
}

/// Injectable clock so tests simulate time without waiting
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
