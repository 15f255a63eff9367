//! Provider call wrapper
//!
//! Two calling conventions, matching how the engine consumes operations:
//! lookups retry retryable errors internally until they stop (the engine
//! only ever sees success or a run-ending error), while launch attempts are
//! single-shot — the wrapper classifies, performs the fixed back-off sleep
//! for retryable kinds, and hands the classified error back so the engine
//! decides whether to loop.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use freeseat_core::{
    AcquisitionTarget, ComputeProvider, InstanceSnapshot, ProviderError, Sleeper,
};

use crate::error::Result;
use crate::ocicli::{AvailabilityDomainInfo, ImageInfo, OciCli, SubnetInfo};
use crate::runner::CliRunner;

/// OCI compute provider
#[derive(Debug, Clone)]
pub struct OciProvider<C, S> {
    cli: OciCli<C>,
    sleeper: S,
    wait: Duration,
}

impl<C, S> OciProvider<C, S>
where
    C: CliRunner,
    S: Sleeper,
{
    /// `wait` is the fixed back-off applied after every retryable
    /// classification.
    pub fn new(cli: OciCli<C>, sleeper: S, wait: Duration) -> Self {
        Self { cli, sleeper, wait }
    }

    /// Absorb retryable errors until the operation stops failing. Anything
    /// non-retryable (including LimitExceeded, which cannot apply to a
    /// lookup) surfaces to the caller.
    async fn retrying<T, Fut>(
        &self,
        operation: &str,
        call: impl Fn() -> Fut,
    ) -> std::result::Result<T, ProviderError>
    where
        Fut: Future<Output = Result<T>>,
    {
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let err = err.into_provider_error();
                    if !err.kind.is_retryable() {
                        return Err(err);
                    }
                    tracing::info!(
                        operation,
                        code = %err.code,
                        status = ?err.status,
                        wait_secs = self.wait.as_secs(),
                        "retryable provider error, backing off"
                    );
                    self.sleeper.sleep(self.wait).await;
                }
            }
        }
    }

    /// One classified attempt. A retryable error sleeps the fixed back-off
    /// here, before control returns, so the caller only decides whether to
    /// loop.
    async fn once<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T>>,
    ) -> std::result::Result<T, ProviderError> {
        match call.await {
            Ok(value) => Ok(value),
            Err(err) => {
                let err = err.into_provider_error();
                if err.kind.is_retryable() {
                    tracing::info!(
                        operation,
                        code = %err.code,
                        status = ?err.status,
                        wait_secs = self.wait.as_secs(),
                        "retryable provider error, backing off"
                    );
                    self.sleeper.sleep(self.wait).await;
                }
                Err(err)
            }
        }
    }

    /// Tenancy of the operator user
    pub async fn resolve_tenancy(
        &self,
        user_id: &str,
    ) -> std::result::Result<String, ProviderError> {
        let user = self
            .retrying("get_user", || self.cli.get_user(user_id))
            .await?;
        Ok(user.compartment_id)
    }

    pub async fn list_availability_domains(
        &self,
        compartment_id: &str,
    ) -> std::result::Result<Vec<AvailabilityDomainInfo>, ProviderError> {
        self.retrying("list_availability_domains", || {
            self.cli.list_availability_domains(compartment_id)
        })
        .await
    }

    pub async fn list_subnets(
        &self,
        compartment_id: &str,
    ) -> std::result::Result<Vec<SubnetInfo>, ProviderError> {
        self.retrying("list_subnets", || self.cli.list_subnets(compartment_id))
            .await
    }

    pub async fn list_images(
        &self,
        compartment_id: &str,
        shape: &str,
    ) -> std::result::Result<Vec<ImageInfo>, ProviderError> {
        self.retrying("list_images", || self.cli.list_images(compartment_id, shape))
            .await
    }
}

#[async_trait]
impl<C, S> ComputeProvider for OciProvider<C, S>
where
    C: CliRunner,
    S: Sleeper,
{
    async fn list_instances(
        &self,
        compartment_id: &str,
    ) -> std::result::Result<Vec<InstanceSnapshot>, ProviderError> {
        let instances = self
            .retrying("list_instances", || self.cli.list_instances(compartment_id))
            .await?;
        Ok(instances.into_iter().map(Into::into).collect())
    }

    async fn launch(
        &self,
        target: &AcquisitionTarget,
        availability_domain: &str,
    ) -> std::result::Result<(), ProviderError> {
        self.once(
            "launch_instance",
            self.cli.launch_instance(target, availability_domain),
        )
        .await
    }
}
