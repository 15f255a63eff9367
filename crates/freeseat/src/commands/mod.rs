pub mod acquire;
pub mod check;
pub mod resolve;

use freeseat_cloud_oci::{OciCli, OciProvider, OciResolver, ResolverConfig, TokioCliRunner};
use freeseat_config::Settings;
use freeseat_core::TokioSleeper;

pub(crate) type Provider = OciProvider<TokioCliRunner, TokioSleeper>;
pub(crate) type Resolver = OciResolver<TokioCliRunner, TokioSleeper>;

/// Wire the provider and resolver from validated settings
pub(crate) fn provider_and_resolver(settings: &Settings) -> anyhow::Result<(Provider, Resolver)> {
    let ssh_public_key = settings.read_ssh_public_key()?;
    let user_id = settings.resolve_user_ocid()?;

    let cli = OciCli::new(TokioCliRunner)
        .with_config_file(settings.oci_config_file.clone())
        .with_profile(settings.oci_profile.clone());
    let provider = OciProvider::new(cli, TokioSleeper, settings.wait);

    let resolver = OciResolver::new(
        provider.clone(),
        ResolverConfig {
            user_id,
            shape: settings.shape,
            desired_count: settings.desired_count(),
            display_name: settings.display_name.clone(),
            ad_suffixes: settings.ad_suffixes.clone(),
            subnet_id: settings.subnet_id.clone(),
            image_id: settings.image_id.clone(),
            operating_system: settings.operating_system.clone(),
            operating_system_version: settings.operating_system_version.clone(),
            ssh_public_key,
        },
    );

    Ok((provider, resolver))
}
