//! `destroy` workflow: delete the profile's instance without imaging it.

use anyhow::Result;

use crate::application::ports::{
    ComputeProvider, Confirmer, InterruptSignal, ProgressIndicator, ProgressLabels,
};
use crate::application::services::instance::{find_profile_instance, step};
use crate::application::services::operation::OperationWaiter;
use crate::domain::{OperationHandle, Profile};

/// Result of the `destroy` workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// No instance to destroy.
    NotFound,
    /// The user declined.
    Aborted,
    Destroyed,
}

/// Delete the profile's instance in `zone` after confirmation.
///
/// # Errors
///
/// Returns `Interrupted` on Ctrl-C and `WorkflowError::StepFailed` if the
/// delete call or its operation fails.
pub async fn destroy_instance(
    compute: &impl ComputeProvider,
    waiter: &OperationWaiter<'_, impl ProgressIndicator, impl InterruptSignal>,
    confirmer: &impl Confirmer,
    profile: &Profile,
    zone: &str,
) -> Result<DestroyOutcome> {
    let name = profile.instance_name.as_str();
    if find_profile_instance(compute, profile, zone).await?.is_none() {
        return Ok(DestroyOutcome::NotFound);
    }
    if !confirmer.confirm(&format!("Destroy instance '{name}' in zone '{zone}'?"), false)? {
        return Ok(DestroyOutcome::Aborted);
    }

    let op = step("delete instance", compute.delete_instance(name, zone).await)?;
    let labels = ProgressLabels::new(
        format!("Destroying instance '{name}'"),
        format!("Instance '{name}' in zone '{zone}' destroyed"),
    )
    .with_fail(format!("Instance '{name}' was not destroyed"));
    waiter
        .run_step(
            compute,
            OperationHandle::zonal(op.name, zone),
            labels,
            "delete instance",
        )
        .await?;
    Ok(DestroyOutcome::Destroyed)
}
