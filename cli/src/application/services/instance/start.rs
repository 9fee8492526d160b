//! `start` workflow: resume a stopped instance, or recreate it from its
//! latest snapshot image.

use anyhow::Result;

use crate::application::ports::{
    ComputeProvider, InstanceSpec, InterruptSignal, ProgressIndicator, ProgressLabels,
    ProgressReporter,
};
use crate::application::services::instance::{find_profile_instance, step};
use crate::application::services::operation::OperationWaiter;
use crate::domain::instance::source_image;
use crate::domain::{InstanceStatus, OperationHandle, Profile, WorkflowError};

/// Result of the `start` workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Nothing to do.
    AlreadyRunning,
    /// A stopped instance was started.
    Started,
    /// The instance did not exist and was created from a snapshot image.
    CreatedFromImage { image: String },
}

impl StartOutcome {
    /// Whether the instance now runs in the requested zone because of this
    /// call, so the profile zone may be updated.
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, Self::AlreadyRunning)
    }
}

/// Start the profile's instance in `zone`.
///
/// # Errors
///
/// Returns `WorkflowError::NoImage` if the instance is gone and no snapshot
/// exists, `WorkflowError::UnexpectedStatus` for transitional states,
/// `Interrupted` on Ctrl-C, and `WorkflowError::StepFailed` when a provider
/// call or operation fails.
pub async fn start_instance(
    compute: &impl ComputeProvider,
    waiter: &OperationWaiter<'_, impl ProgressIndicator, impl InterruptSignal>,
    reporter: &impl ProgressReporter,
    profile: &Profile,
    zone: &str,
) -> Result<StartOutcome> {
    let name = profile.instance_name.as_str();

    match find_profile_instance(compute, profile, zone).await? {
        Some(instance) => match instance.status() {
            InstanceStatus::Running => Ok(StartOutcome::AlreadyRunning),
            InstanceStatus::Terminated => {
                let op = step("start instance", compute.start_instance(name, zone).await)?;
                let labels = ProgressLabels::new(
                    format!("Instance '{name}' exists. Starting"),
                    format!("Instance '{name}' started in zone '{zone}'"),
                )
                .with_fail(format!("Instance '{name}' did not start"));
                waiter
                    .run_step(
                        compute,
                        OperationHandle::zonal(op.name, zone),
                        labels,
                        "start instance",
                    )
                    .await?;
                Ok(StartOutcome::Started)
            }
            _ => Err(WorkflowError::UnexpectedStatus {
                instance: name.to_owned(),
                status: instance.status,
            }
            .into()),
        },
        None => {
            let family = profile.image_family();
            let image = step("find latest image", compute.latest_image(family).await)?
                .ok_or_else(|| WorkflowError::NoImage {
                    family: family.to_owned(),
                })?;
            reporter.step(&format!("no instance found, restoring from image '{}'", image.name));

            let source = source_image(&profile.project_id, Some(&image.name));
            let spec = InstanceSpec {
                name,
                zone,
                machine_type: &profile.machine_type,
                disk_size_gb: profile.disk_size,
                source_image: &source,
                startup_script: None,
            };
            let op = step("create instance", compute.insert_instance(&spec).await)?;
            let labels = ProgressLabels::new(
                format!("Creating instance from image '{}'", image.name),
                format!("Instance '{name}' created in zone '{zone}'"),
            )
            .with_fail(format!("Instance '{name}' was not created"));
            waiter
                .run_step(
                    compute,
                    OperationHandle::zonal(op.name, zone),
                    labels,
                    "create instance",
                )
                .await?;
            Ok(StartOutcome::CreatedFromImage { image: image.name })
        }
    }
}
