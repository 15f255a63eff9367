//! oci CLI wrapper
//!
//! Typed operations over `oci ... --output json`. Every failed invocation is
//! normalized here: the ServiceError JSON the CLI prints to stderr becomes a
//! classified [`ProviderError`] — nothing downstream re-inspects raw
//! status/code strings.

use std::path::PathBuf;

use freeseat_core::{AcquisitionTarget, InstanceSnapshot, LifecycleState, ProviderError};
use serde::{Deserialize, Serialize};

use crate::error::{OciError, Result};
use crate::runner::CliRunner;

/// oci CLI wrapper
#[derive(Debug, Clone)]
pub struct OciCli<C> {
    runner: C,
    config_file: Option<PathBuf>,
    profile: Option<String>,
}

impl<C: CliRunner> OciCli<C> {
    pub fn new(runner: C) -> Self {
        Self {
            runner,
            config_file: None,
            profile: None,
        }
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Run an oci command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut full_args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        full_args.extend(["--output".to_string(), "json".to_string()]);
        if let Some(ref path) = self.config_file {
            full_args.extend(["--config-file".to_string(), path.display().to_string()]);
        }
        if let Some(ref profile) = self.profile {
            full_args.extend(["--profile".to_string(), profile.clone()]);
        }

        tracing::debug!("Running: oci {}", args.join(" "));

        let output = self.runner.run("oci", &full_args).await?;

        if !output.success {
            return Err(OciError::Service(parse_service_error(&output.stderr)));
        }

        Ok(output.stdout)
    }

    /// Resolve the operator's user record to its tenancy
    pub async fn get_user(&self, user_id: &str) -> Result<UserInfo> {
        let output = self
            .run_command(&["iam", "user", "get", "--user-id", user_id])
            .await?;

        let envelope: Envelope<UserInfo> = serde_json::from_str(&output)?;
        Ok(envelope.data)
    }

    /// List availability domains in a compartment
    pub async fn list_availability_domains(
        &self,
        compartment_id: &str,
    ) -> Result<Vec<AvailabilityDomainInfo>> {
        let output = self
            .run_command(&[
                "iam",
                "availability-domain",
                "list",
                "--compartment-id",
                compartment_id,
            ])
            .await?;

        parse_listing(&output)
    }

    /// List subnets in a compartment
    pub async fn list_subnets(&self, compartment_id: &str) -> Result<Vec<SubnetInfo>> {
        let output = self
            .run_command(&[
                "network",
                "subnet",
                "list",
                "--compartment-id",
                compartment_id,
                "--all",
            ])
            .await?;

        parse_listing(&output)
    }

    /// List images launchable for a shape
    pub async fn list_images(&self, compartment_id: &str, shape: &str) -> Result<Vec<ImageInfo>> {
        let output = self
            .run_command(&[
                "compute",
                "image",
                "list",
                "--compartment-id",
                compartment_id,
                "--shape",
                shape,
                "--all",
            ])
            .await?;

        parse_listing(&output)
    }

    /// List all instances in a compartment
    pub async fn list_instances(&self, compartment_id: &str) -> Result<Vec<OciInstance>> {
        let output = self
            .run_command(&[
                "compute",
                "instance",
                "list",
                "--compartment-id",
                compartment_id,
                "--all",
            ])
            .await?;

        parse_listing(&output)
    }

    /// Launch an instance into one availability domain
    pub async fn launch_instance(
        &self,
        target: &AcquisitionTarget,
        availability_domain: &str,
    ) -> Result<()> {
        let sizing = target.sizing();
        let metadata = serde_json::json!({
            "ssh_authorized_keys": target.ssh_public_key,
        })
        .to_string();
        let shape_config = serde_json::json!({
            "ocpus": sizing.ocpus,
            "memoryInGBs": sizing.memory_gbs,
        })
        .to_string();
        let availability_config = serde_json::json!({
            "recoveryAction": "RESTORE_INSTANCE",
        })
        .to_string();
        let instance_options = serde_json::json!({
            "areLegacyImdsEndpointsDisabled": false,
        })
        .to_string();

        self.run_command(&[
            "compute",
            "instance",
            "launch",
            "--availability-domain",
            availability_domain,
            "--compartment-id",
            target.compartment_id.as_str(),
            "--shape",
            target.shape.as_str(),
            "--image-id",
            target.image_id.as_str(),
            "--subnet-id",
            target.subnet_id.as_str(),
            "--display-name",
            target.display_name.as_str(),
            "--assign-public-ip",
            "false",
            "--assign-private-dns-record",
            "true",
            "--metadata",
            metadata.as_str(),
            "--shape-config",
            shape_config.as_str(),
            "--availability-config",
            availability_config.as_str(),
            "--instance-options",
            instance_options.as_str(),
        ])
        .await?;

        Ok(())
    }
}

/// The oci CLI prints nothing at all for an empty listing
fn parse_listing<T: serde::de::DeserializeOwned>(output: &str) -> Result<Vec<T>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }
    let envelope: Envelope<Vec<T>> = serde_json::from_str(output)?;
    Ok(envelope.data)
}

/// Extract {status, code, message} from the ServiceError JSON the CLI prints
/// to stderr. Anything unparsable classifies as fatal with the raw text, so
/// unrecognized errors are never silently swallowed.
fn parse_service_error(stderr: &str) -> ProviderError {
    if let (Some(start), Some(end)) = (stderr.find('{'), stderr.rfind('}')) {
        if start < end {
            if let Ok(raw) = serde_json::from_str::<RawServiceError>(&stderr[start..=end]) {
                return ProviderError::classify(
                    raw.status,
                    raw.code.unwrap_or_default(),
                    raw.message.unwrap_or_default(),
                );
            }
        }
    }
    ProviderError::fatal(stderr.trim())
}

#[derive(Debug, Deserialize)]
struct RawServiceError {
    status: Option<u16>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Operator user record
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: String,

    #[serde(rename = "compartment-id")]
    pub compartment_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityDomainInfo {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubnetInfo {
    pub id: String,

    #[serde(rename = "display-name")]
    pub display_name: Option<String>,
}

/// Image record; serializes with the fixed snake_case key set used for the
/// `images_list.json` dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    #[serde(rename(deserialize = "lifecycle-state"))]
    pub lifecycle_state: String,

    #[serde(rename(deserialize = "display-name"))]
    pub display_name: String,

    pub id: String,

    #[serde(rename(deserialize = "operating-system"))]
    pub operating_system: String,

    #[serde(rename(deserialize = "operating-system-version"))]
    pub operating_system_version: String,

    #[serde(rename(deserialize = "size-in-mbs"))]
    pub size_in_mbs: Option<u64>,

    #[serde(rename(deserialize = "time-created"))]
    pub time_created: Option<String>,
}

/// Instance record from the listing API
#[derive(Debug, Clone, Deserialize)]
pub struct OciInstance {
    pub id: String,

    #[serde(rename = "display-name")]
    pub display_name: String,

    #[serde(rename = "availability-domain")]
    pub availability_domain: String,

    pub shape: String,

    #[serde(rename = "lifecycle-state")]
    pub lifecycle_state: LifecycleState,

    #[serde(rename = "time-created")]
    pub time_created: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<OciInstance> for InstanceSnapshot {
    fn from(instance: OciInstance) -> Self {
        InstanceSnapshot {
            id: instance.id,
            display_name: instance.display_name,
            availability_domain: instance.availability_domain,
            shape: instance.shape,
            lifecycle_state: instance.lifecycle_state,
            time_created: instance.time_created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freeseat_core::ErrorKind;

    #[test]
    fn service_error_json_is_extracted_and_classified() {
        let stderr = concat!(
            "ServiceError:\n",
            "{\n",
            "    \"client_version\": \"Oracle-PythonSDK/2.112.1\",\n",
            "    \"code\": \"InternalError\",\n",
            "    \"message\": \"Out of host capacity.\",\n",
            "    \"status\": 500\n",
            "}\n",
        );
        let err = parse_service_error(stderr);
        assert_eq!(err.status, Some(500));
        assert_eq!(err.code, "InternalError");
        assert_eq!(err.kind, ErrorKind::RetryableCapacity);
    }

    #[test]
    fn unparsable_stderr_classifies_fatal_with_the_raw_text() {
        let err = parse_service_error("oci: command exploded before reaching the API");
        assert_eq!(err.kind, ErrorKind::Fatal);
        assert!(err.message.contains("exploded"));
    }

    #[test]
    fn listing_parses_kebab_case_fields() {
        let payload = r#"{
            "data": [
                {
                    "id": "ocid1.instance.oc1..aaa",
                    "display-name": "seat-of-power",
                    "availability-domain": "xyz:EU-FRANKFURT-1-AD-2",
                    "shape": "VM.Standard.A1.Flex",
                    "lifecycle-state": "RUNNING",
                    "time-created": "2026-08-01T10:15:30+00:00"
                }
            ]
        }"#;
        let instances: Vec<OciInstance> = parse_listing(payload).unwrap();
        assert_eq!(instances.len(), 1);
        let snapshot: InstanceSnapshot = instances[0].clone().into();
        assert_eq!(snapshot.display_name, "seat-of-power");
        assert_eq!(snapshot.lifecycle_state, LifecycleState::Running);
    }

    #[test]
    fn empty_stdout_means_empty_listing() {
        let instances: Vec<OciInstance> = parse_listing("  \n").unwrap();
        assert!(instances.is_empty());
    }

    #[test]
    fn image_dump_uses_the_fixed_snake_case_keys() {
        let image = ImageInfo {
            lifecycle_state: "AVAILABLE".to_string(),
            display_name: "Canonical-Ubuntu-24.04-aarch64-2026.07.01-0".to_string(),
            id: "ocid1.image.oc1..aaa".to_string(),
            operating_system: "Canonical Ubuntu".to_string(),
            operating_system_version: "24.04".to_string(),
            size_in_mbs: Some(47694),
            time_created: Some("2026-07-01T00:00:00+00:00".to_string()),
        };
        let value = serde_json::to_value(&image).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "lifecycle_state",
            "display_name",
            "id",
            "operating_system",
            "operating_system_version",
            "size_in_mbs",
            "time_created",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }
}
