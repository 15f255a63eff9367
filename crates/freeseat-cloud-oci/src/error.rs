//! OCI provider error types

use freeseat_core::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OciError {
    #[error("oci CLI not found. Install it and run: oci setup config")]
    CliNotFound,

    #[error("failed to run the oci CLI: {0}")]
    Io(#[from] std::io::Error),

    #[error("oci CLI returned invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Service(#[from] ProviderError),
}

impl OciError {
    /// Collapse into the classified error the engine consumes. Transport
    /// failures (spawn, bad JSON) never came from the provider API, so they
    /// classify as fatal.
    pub fn into_provider_error(self) -> ProviderError {
        match self {
            OciError::Service(err) => err,
            other => ProviderError::fatal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, OciError>;
