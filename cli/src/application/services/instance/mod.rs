//! Instance lifecycle workflows: create, start, stop, destroy, status.
//!
//! Each workflow is a short sequence of provider calls. Every mutating call
//! returns an operation that is waited on through [`OperationWaiter`] before
//! the next step runs. Imports only from `crate::domain` and
//! `crate::application`.

pub mod create;
pub mod destroy;
pub mod start;
pub mod stop;

use anyhow::Result;

use crate::application::ports::InstanceInspector;
use crate::domain::{Instance, Profile, WorkflowError};

pub use create::{CreateOptions, CreateOutcome, create_instance};
pub use destroy::{DestroyOutcome, destroy_instance};
pub use start::{StartOutcome, start_instance};
pub use stop::{StopOptions, StopReport, stop_instance};

/// Map a failed provider call to the workflow step it belongs to.
pub(crate) fn step<T>(step: &'static str, result: Result<T>) -> Result<T, WorkflowError> {
    result.map_err(|e| WorkflowError::StepFailed {
        step,
        message: format!("{e:#}"),
    })
}

/// Fetch the profile's instance in `zone`.
///
/// # Errors
///
/// Returns `WorkflowError::StepFailed` if the lookup itself fails.
pub async fn find_profile_instance(
    compute: &impl InstanceInspector,
    profile: &Profile,
    zone: &str,
) -> Result<Option<Instance>> {
    let instance = step(
        "look up instance",
        compute.get_instance(&profile.instance_name, zone).await,
    )?;
    tracing::debug!(
        instance = %profile.instance_name,
        zone,
        status = instance.as_ref().map_or("missing", |i| i.status.as_str()),
        "instance lookup"
    );
    Ok(instance)
}

/// Instances in `zone`, sorted by name.
///
/// # Errors
///
/// Returns `WorkflowError::StepFailed` if listing fails.
pub async fn list_zone_instances(
    compute: &impl InstanceInspector,
    zone: &str,
) -> Result<Vec<Instance>> {
    let mut instances = step("list instances", compute.list_instances(zone).await)?;
    instances.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(instances)
}
