//! Data model for instance acquisition

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Supported compute shapes (closed set)
///
/// Free-tier accounts are limited to these two shapes, and the resource
/// sizing for each is fixed by the provider's always-free terms rather than
/// chosen per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// `VM.Standard.A1.Flex` — ARM flexible shape, at most one per account
    A1Flex,
    /// `VM.Standard.E2.1.Micro` — x86 micro shape, up to two per account
    E2Micro,
}

/// Fixed resource sizing for a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeSizing {
    pub ocpus: u32,
    pub memory_gbs: u32,
}

impl Shape {
    pub const ALL: [Shape; 2] = [Shape::A1Flex, Shape::E2Micro];

    /// Provider identifier for this shape
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::A1Flex => "VM.Standard.A1.Flex",
            Shape::E2Micro => "VM.Standard.E2.1.Micro",
        }
    }

    /// Parse a provider shape identifier
    pub fn parse(s: &str) -> Option<Shape> {
        Shape::ALL.into_iter().find(|shape| shape.as_str() == s)
    }

    /// Whether the account can hold at most one instance of this shape
    ///
    /// Drives the existence-check policy: a single-instance shape is
    /// satisfied by any matching instance, a multi-instance shape by an
    /// exact count.
    pub fn is_single_instance(&self) -> bool {
        matches!(self, Shape::A1Flex)
    }

    /// Fixed sizing lookup, keyed by shape
    pub fn sizing(&self) -> ShapeSizing {
        match self {
            Shape::A1Flex => ShapeSizing {
                ocpus: 4,
                memory_gbs: 24,
            },
            Shape::E2Micro => ShapeSizing {
                ocpus: 1,
                memory_gbs: 1,
            },
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shape::parse(s).ok_or_else(|| format!("{s} is not a supported shape"))
    }
}

/// Provider lifecycle states for a compute instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Provisioning,
    Running,
    Starting,
    Stopping,
    Stopped,
    CreatingImage,
    Terminating,
    Terminated,
    /// Any state this build does not know about
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LifecycleState::Provisioning => "PROVISIONING",
            LifecycleState::Running => "RUNNING",
            LifecycleState::Starting => "STARTING",
            LifecycleState::Stopping => "STOPPING",
            LifecycleState::Stopped => "STOPPED",
            LifecycleState::CreatingImage => "CREATING_IMAGE",
            LifecycleState::Terminating => "TERMINATING",
            LifecycleState::Terminated => "TERMINATED",
            LifecycleState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Attributes of a single compute instance, as read from the provider
///
/// Snapshots are ephemeral: produced by one listing, consumed by one
/// existence check, never cached across checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    pub id: String,
    pub display_name: String,
    pub availability_domain: String,
    pub shape: String,
    pub lifecycle_state: LifecycleState,
    pub time_created: Option<DateTime<Utc>>,
}

/// The desired end state of a run
///
/// Built once from resolved identifiers, then never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionTarget {
    pub shape: Shape,
    /// 1, or 2 when the second-instance policy is enabled for a micro shape
    pub desired_count: u32,
    pub display_name: String,
    pub compartment_id: String,
    pub image_id: String,
    pub subnet_id: String,
    /// SSH public key material injected as instance metadata
    pub ssh_public_key: String,
    /// Eligible availability domains, cycled across launch attempts
    pub availability_domains: Vec<String>,
}

impl AcquisitionTarget {
    pub fn sizing(&self) -> ShapeSizing {
        self.shape.sizing()
    }
}

/// Terminal result of an acquisition run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A satisfying instance already existed; no launch was issued for it
    Satisfied(InstanceSnapshot),
    /// A launch was accepted. The snapshot is absent when the instance
    /// listing had not caught up yet; a later run finds it via the initial
    /// probe.
    Succeeded(Option<InstanceSnapshot>),
    /// An unrecoverable error ended the run
    Failed(ProviderError),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RunOutcome::Failed(_))
    }
}
