//! Instance existence check
//!
//! Decides whether the account already satisfies the acquisition goal.
//! The selection rule is asymmetric by shape class because the goal differs:
//! "get me one" (any match will do) versus "get me a second one without
//! disturbing the first" (an exact count is required).

use std::time::Duration;

use crate::error::ProviderError;
use crate::model::{AcquisitionTarget, InstanceSnapshot, LifecycleState};
use crate::provider::{ComputeProvider, Sleeper};

/// Lifecycle states that count as a satisfying instance
pub const DEFAULT_ACCEPTED_STATES: [LifecycleState; 2] =
    [LifecycleState::Running, LifecycleState::Provisioning];

/// Spacing between polling tries when more than one is requested
pub const CHECK_SPACING: Duration = Duration::from_secs(60);

/// Select the instance that satisfies the target, if any
///
/// Single-instance shape class: the first matching instance wins.
/// Multi-instance shape class: satisfied only at the exact desired count
/// boundary — exactly one match when one is desired, more than one when a
/// second is desired — with the last-listed match as the representative.
pub fn select_satisfying<'a>(
    instances: &'a [InstanceSnapshot],
    target: &AcquisitionTarget,
    accepted: &[LifecycleState],
) -> Option<&'a InstanceSnapshot> {
    let matching: Vec<&InstanceSnapshot> = instances
        .iter()
        .filter(|i| i.shape == target.shape.as_str() && accepted.contains(&i.lifecycle_state))
        .collect();

    if target.shape.is_single_instance() {
        return matching.first().copied();
    }

    if target.desired_count > 1 {
        if matching.len() > 1 {
            matching.last().copied()
        } else {
            None
        }
    } else if matching.len() == 1 {
        matching.last().copied()
    } else {
        None
    }
}

/// Poll the provider until a satisfying instance is found or the tries run
/// out. Returns the representative snapshot immediately on satisfaction; the
/// fixed spacing sleep is skipped after the final try.
pub async fn find_satisfying(
    provider: &dyn ComputeProvider,
    target: &AcquisitionTarget,
    accepted: &[LifecycleState],
    tries: u32,
    spacing: Duration,
    sleeper: &dyn Sleeper,
) -> Result<Option<InstanceSnapshot>, ProviderError> {
    let tries = tries.max(1);
    for attempt in 1..=tries {
        let instances = provider.list_instances(&target.compartment_id).await?;
        if let Some(found) = select_satisfying(&instances, target, accepted) {
            tracing::info!(
                instance_id = %found.id,
                state = %found.lifecycle_state,
                "found a satisfying instance"
            );
            return Ok(Some(found.clone()));
        }
        tracing::debug!(attempt, tries, "no satisfying instance yet");
        if attempt < tries {
            sleeper.sleep(spacing).await;
        }
    }
    Ok(None)
}
