//! Resource resolver
//!
//! One-shot, order-dependent lookups that turn configuration into concrete
//! provider identifiers: operator user → tenancy → availability domains →
//! subnet → image. Each filtered lookup fails explicitly when its filter
//! matches nothing — resolution signals misconfiguration, never transient
//! unavailability, so there are no retry semantics here beyond what the
//! call wrapper already absorbs.

use async_trait::async_trait;
use freeseat_core::{
    AcquisitionTarget, ProviderError, Recorder, Shape, Sleeper, TargetResolver,
};

use crate::provider::OciProvider;
use crate::runner::CliRunner;

/// Inputs the resolver needs, lifted out of run configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Operator user OCID from the OCI profile
    pub user_id: String,
    pub shape: Shape,
    pub desired_count: u32,
    pub display_name: String,
    /// Comma-separated AD suffix filter, already split
    pub ad_suffixes: Vec<String>,
    pub subnet_id: Option<String>,
    pub image_id: Option<String>,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    pub ssh_public_key: String,
}

/// Resolves an [`AcquisitionTarget`] against OCI
pub struct OciResolver<C, S> {
    provider: OciProvider<C, S>,
    config: ResolverConfig,
}

impl<C, S> OciResolver<C, S>
where
    C: CliRunner,
    S: Sleeper,
{
    pub fn new(provider: OciProvider<C, S>, config: ResolverConfig) -> Self {
        Self { provider, config }
    }

    async fn resolve_availability_domains(
        &self,
        compartment_id: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let domains = self.provider.list_availability_domains(compartment_id).await?;
        let eligible: Vec<String> = domains
            .into_iter()
            .map(|d| d.name)
            .filter(|name| self.config.ad_suffixes.iter().any(|s| name.ends_with(s)))
            .collect();

        if eligible.is_empty() {
            return Err(ProviderError::not_found(format!(
                "no availability domain matches the suffix filter {:?}",
                self.config.ad_suffixes
            )));
        }
        tracing::info!(availability_domains = ?eligible, "resolved availability domains");
        Ok(eligible)
    }

    async fn resolve_subnet(&self, compartment_id: &str) -> Result<String, ProviderError> {
        if let Some(ref subnet_id) = self.config.subnet_id {
            tracing::info!(subnet_id = %subnet_id, "using configured subnet");
            return Ok(subnet_id.clone());
        }

        let subnets = self.provider.list_subnets(compartment_id).await?;
        let first = subnets
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::not_found("no subnet found in the tenancy"))?;
        tracing::info!(subnet_id = %first.id, "resolved subnet");
        Ok(first.id)
    }

    async fn resolve_image(
        &self,
        compartment_id: &str,
        recorder: &dyn Recorder,
    ) -> Result<String, ProviderError> {
        if let Some(ref image_id) = self.config.image_id {
            tracing::info!(image_id = %image_id, "using configured image");
            return Ok(image_id.clone());
        }

        let (Some(os), Some(os_version)) = (
            self.config.operating_system.as_deref(),
            self.config.operating_system_version.as_deref(),
        ) else {
            return Err(ProviderError::not_found(
                "no image id configured and the operating system filter is incomplete",
            ));
        };

        let images = self
            .provider
            .list_images(compartment_id, self.config.shape.as_str())
            .await?;

        // Leave the candidate list on disk so an operator can pick an
        // explicit override from it
        match serde_json::to_value(&images) {
            Ok(dump) => {
                if let Err(err) = recorder.record_image_list(&dump).await {
                    tracing::warn!(error = %err, "image list dump could not be written");
                }
            }
            Err(err) => tracing::warn!(error = %err, "image list dump could not be serialized"),
        }

        let image = images
            .into_iter()
            .find(|image| {
                image.operating_system == os && image.operating_system_version == os_version
            })
            .ok_or_else(|| {
                ProviderError::not_found(format!(
                    "no image for shape {} matches {os} {os_version}",
                    self.config.shape
                ))
            })?;

        tracing::info!(image_id = %image.id, display_name = %image.display_name, "resolved image");
        Ok(image.id)
    }
}

#[async_trait]
impl<C, S> TargetResolver for OciResolver<C, S>
where
    C: CliRunner,
    S: Sleeper,
{
    async fn resolve(&self, recorder: &dyn Recorder) -> Result<AcquisitionTarget, ProviderError> {
        let tenancy = self.provider.resolve_tenancy(&self.config.user_id).await?;
        tracing::info!(tenancy = %tenancy, "resolved tenancy");

        let availability_domains = self.resolve_availability_domains(&tenancy).await?;
        let subnet_id = self.resolve_subnet(&tenancy).await?;
        let image_id = self.resolve_image(&tenancy, recorder).await?;

        Ok(AcquisitionTarget {
            shape: self.config.shape,
            desired_count: self.config.desired_count,
            display_name: self.config.display_name.clone(),
            compartment_id: tenancy,
            image_id,
            subnet_id,
            ssh_public_key: self.config.ssh_public_key.clone(),
            availability_domains,
        })
    }
}
