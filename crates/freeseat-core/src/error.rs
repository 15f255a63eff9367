//! Error taxonomy and classification
//!
//! Every provider failure is classified exactly once, at the call-wrapper
//! boundary, into a [`ProviderError`] carrying its [`ErrorKind`]. Downstream
//! code matches on the kind; nothing re-inspects raw status/code strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The capacity-exhaustion message the provider returns while a launch
/// target has no free hosts. Appears as either the error code or message.
pub const OUT_OF_HOST_CAPACITY: &str = "Out of host capacity.";

const BAD_GATEWAY: &str = "Bad Gateway";

/// Classification of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The launch target has no free hosts right now; retried on a fixed
    /// cadence because capacity windows refill on one.
    RetryableCapacity,
    /// Request throttled (`TooManyRequests`)
    RetryableRateLimit,
    /// Gateway/server flakiness (502, `InternalError`)
    RetryableGateway,
    /// The account's instance quota is already consumed. Not fatal: routes
    /// the engine back to the existence check, since the ceiling itself is
    /// evidence a matching instance may already exist.
    LimitExceeded,
    /// Anything else; ends the run
    Fatal,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RetryableCapacity
                | ErrorKind::RetryableRateLimit
                | ErrorKind::RetryableGateway
        )
    }
}

/// A classified provider error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub status: Option<u16>,
    pub code: String,
    pub message: String,
    pub kind: ErrorKind,
}

impl ProviderError {
    /// Classify a raw {status, code, message} triple
    pub fn classify(
        status: Option<u16>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let code = code.into();
        let message = message.into();
        let kind = classify(status, &code, &message);
        Self {
            status,
            code,
            message,
            kind,
        }
    }

    /// An unrecoverable error that did not come back from the provider API
    /// (spawn failure, unparsable payload, misconfiguration)
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: "Unhandled".to_string(),
            message: message.into(),
            kind: ErrorKind::Fatal,
        }
    }

    /// A resolution lookup whose filter matched nothing
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: "NotFound".to_string(),
            message: message.into(),
            kind: ErrorKind::Fatal,
        }
    }
}

fn classify(status: Option<u16>, code: &str, message: &str) -> ErrorKind {
    if code == "LimitExceeded" {
        return ErrorKind::LimitExceeded;
    }
    if code == OUT_OF_HOST_CAPACITY || message == OUT_OF_HOST_CAPACITY {
        return ErrorKind::RetryableCapacity;
    }
    if code == "TooManyRequests" {
        return ErrorKind::RetryableRateLimit;
    }
    if code == "InternalError" || message == BAD_GATEWAY || status == Some(502) {
        return ErrorKind::RetryableGateway;
    }
    ErrorKind::Fatal
}

/// Core errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("recorder error: {0}")]
    Recorder(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
