//! Run configuration
//!
//! Settings are read once at startup — from `FREESEAT_*` environment
//! variables, optionally layered over a `freeseat.env` file — validated into
//! an immutable [`Settings`] struct and passed explicitly into the resolver
//! and engine. The operator's user OCID comes from the same profile file the
//! oci CLI authenticates with.

pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use freeseat_core::Shape;
use serde::Deserialize;

const DEFAULT_WAIT_SECS: u64 = 60;
const DEFAULT_CHECK_TRIES: u32 = 3;
const DEFAULT_PROFILE: &str = "DEFAULT";

/// Immutable run configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub shape: Shape,
    pub display_name: String,
    /// Availability-domain suffix filter (comma-separated in the source)
    pub ad_suffixes: Vec<String>,
    pub subnet_id: Option<String>,
    pub image_id: Option<String>,
    pub operating_system: Option<String>,
    pub operating_system_version: Option<String>,
    pub ssh_public_key_path: PathBuf,
    /// Fixed back-off applied after every retryable classification
    pub wait: Duration,
    /// Polling tries for the patient existence check
    pub check_tries: u32,
    /// Acquire a second micro instance instead of the first
    pub second_micro: bool,
    pub webhook_url: Option<String>,
    pub oci_config_file: PathBuf,
    pub oci_profile: String,
    pub artifact_dir: PathBuf,
}

/// Raw string-typed view the sources deserialize into
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    shape: Option<String>,
    display_name: Option<String>,
    ad_suffixes: Option<String>,
    subnet_id: Option<String>,
    image_id: Option<String>,
    os: Option<String>,
    os_version: Option<String>,
    ssh_public_key: Option<String>,
    wait_secs: Option<String>,
    check_tries: Option<String>,
    second_micro: Option<String>,
    webhook_url: Option<String>,
    oci_profile: Option<String>,
    artifact_dir: Option<String>,
}

impl Settings {
    /// Load and validate settings. `env_file`, when given, is layered under
    /// the real environment (a set variable always wins).
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = env_file {
            builder = builder.add_source(File::from(path.to_path_buf()).format(FileFormat::Ini));
        }
        let raw: RawSettings = builder
            .add_source(Environment::with_prefix("FREESEAT"))
            .build()?
            .try_deserialize()?;

        let shape = match raw.shape.filter(|s| !s.trim().is_empty()) {
            Some(value) => {
                let value = value.trim().to_string();
                Shape::parse(&value).ok_or(ConfigError::UnsupportedShape(value))?
            }
            None => Shape::A1Flex,
        };

        let display_name = non_empty(raw.display_name).ok_or(ConfigError::Missing("display_name"))?;

        let ad_suffixes: Vec<String> = raw
            .ad_suffixes
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if ad_suffixes.is_empty() {
            return Err(ConfigError::Missing("ad_suffixes"));
        }

        let image_id = non_empty(raw.image_id);
        let operating_system = non_empty(raw.os);
        let operating_system_version = non_empty(raw.os_version);
        if image_id.is_none() && (operating_system.is_none() || operating_system_version.is_none())
        {
            return Err(ConfigError::Missing("os/os_version (or an explicit image_id)"));
        }

        let ssh_public_key_path = non_empty(raw.ssh_public_key)
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("ssh_public_key"))?;

        let wait = Duration::from_secs(parse_or("wait_secs", raw.wait_secs, DEFAULT_WAIT_SECS)?);
        let check_tries = parse_or("check_tries", raw.check_tries, DEFAULT_CHECK_TRIES)?;
        let second_micro = parse_bool("second_micro", raw.second_micro)?;

        let oci_config_file = match std::env::var("OCI_CLI_CONFIG_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => dirs::home_dir()
                .ok_or(ConfigError::HomeDirNotFound)?
                .join(".oci")
                .join("config"),
        };

        let settings = Self {
            shape,
            display_name,
            ad_suffixes,
            subnet_id: non_empty(raw.subnet_id),
            image_id,
            operating_system,
            operating_system_version,
            ssh_public_key_path,
            wait,
            check_tries,
            second_micro,
            webhook_url: non_empty(raw.webhook_url),
            oci_config_file,
            oci_profile: non_empty(raw.oci_profile).unwrap_or_else(|| DEFAULT_PROFILE.to_string()),
            artifact_dir: non_empty(raw.artifact_dir)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        tracing::debug!(
            shape = %settings.shape,
            desired_count = settings.desired_count(),
            wait_secs = settings.wait.as_secs(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// 1, or 2 when the second-instance policy applies to a micro shape
    pub fn desired_count(&self) -> u32 {
        if self.shape == Shape::E2Micro && self.second_micro {
            2
        } else {
            1
        }
    }

    /// SSH public key material to inject as instance metadata
    pub fn read_ssh_public_key(&self) -> Result<String> {
        if !self.ssh_public_key_path.is_file() {
            return Err(ConfigError::SshKeyNotFound(self.ssh_public_key_path.clone()));
        }
        Ok(std::fs::read_to_string(&self.ssh_public_key_path)?
            .trim()
            .to_string())
    }

    /// Operator user OCID from the OCI profile file
    pub fn resolve_user_ocid(&self) -> Result<String> {
        let cfg = Config::builder()
            .add_source(File::from(self.oci_config_file.clone()).format(FileFormat::Ini))
            .build()?;

        // config lowercases keys from file sources
        let key = format!("{}.user", self.oci_profile.to_lowercase());
        cfg.get_string(&key)
            .map_err(|_| ConfigError::UserOcidNotFound {
                path: self.oci_config_file.clone(),
                profile: self.oci_profile.clone(),
            })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T> {
    match non_empty(value) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool> {
    match non_empty(value).as_deref() {
        None => Ok(false),
        Some("true") | Some("True") | Some("1") => Ok(true),
        Some("false") | Some("False") | Some("0") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            name,
            value: other.to_string(),
        }),
    }
}
