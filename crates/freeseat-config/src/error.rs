use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} is not a supported shape")]
    UnsupportedShape(String),

    #[error("SSH public key file not found: {0}")]
    SshKeyNotFound(PathBuf),

    #[error("operator user OCID not found in {path} (profile {profile})")]
    UserOcidNotFound { path: PathBuf, profile: String },

    #[error("home directory could not be determined")]
    HomeDirNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
