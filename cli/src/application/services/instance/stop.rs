//! `stop` workflow: stop, snapshot to an image, prune old images, delete.
//!
//! Step order is fixed and each step waits for its operation before the next
//! one starts:
//!
//! 1. stop the instance if it is running
//! 2. unless `basic`: image the boot disk into the profile's family
//! 3. unless `basic`: delete every other image of the family
//! 4. unless `basic` or `keep`: delete the instance

use anyhow::Result;
use chrono::Utc;

use crate::application::ports::{
    ComputeProvider, ImageSpec, InterruptSignal, ProgressIndicator, ProgressLabels,
    ProgressReporter,
};
use crate::application::services::instance::{find_profile_instance, step};
use crate::application::services::operation::OperationWaiter;
use crate::domain::instance::{dangling_images, snapshot_image_name};
use crate::domain::{Instance, InstanceStatus, OperationHandle, Profile, WorkflowError};

/// Flags of the `stop` workflow.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StopOptions {
    /// Keep the instance after imaging it.
    pub keep: bool,
    /// Only stop; no image, no deletion.
    pub basic: bool,
}

/// What the `stop` workflow did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StopReport {
    /// The instance was running and has been stopped.
    pub stopped: bool,
    /// Name of the snapshot image created.
    pub image: Option<String>,
    /// Older images of the family that were deleted.
    pub deleted_images: Vec<String>,
    /// The instance was deleted.
    pub instance_deleted: bool,
}

/// Run the `stop` workflow for the profile's instance in `zone`.
///
/// # Errors
///
/// Returns `WorkflowError::InstanceNotFound` if the instance does not exist,
/// `WorkflowError::MissingTargetLink` if image creation succeeds without
/// naming the image, `Interrupted` on Ctrl-C, and
/// `WorkflowError::StepFailed` when any step fails.
pub async fn stop_instance(
    compute: &impl ComputeProvider,
    waiter: &OperationWaiter<'_, impl ProgressIndicator, impl InterruptSignal>,
    reporter: &impl ProgressReporter,
    profile: &Profile,
    zone: &str,
    opts: StopOptions,
) -> Result<StopReport> {
    let name = profile.instance_name.as_str();
    let mut report = StopReport::default();

    let instance = find_profile_instance(compute, profile, zone)
        .await?
        .ok_or_else(|| WorkflowError::InstanceNotFound {
            instance: name.to_owned(),
            zone: zone.to_owned(),
        })?;

    match instance.status() {
        InstanceStatus::Running => {
            let op = step("stop instance", compute.stop_instance(name, zone).await)?;
            let labels = ProgressLabels::new(
                format!("Stopping instance '{name}' in zone '{zone}'"),
                format!("Instance '{name}' in zone '{zone}' stopped"),
            )
            .with_fail(format!("Instance '{name}' did not stop"));
            waiter
                .run_step(
                    compute,
                    OperationHandle::zonal(op.name, zone),
                    labels,
                    "stop instance",
                )
                .await?;
            report.stopped = true;
        }
        InstanceStatus::Terminated => {
            reporter.step(&format!("instance '{name}' is already stopped"));
        }
        _ => {
            return Err(WorkflowError::UnexpectedStatus {
                instance: name.to_owned(),
                status: instance.status.clone(),
            }
            .into());
        }
    }

    if opts.basic {
        return Ok(report);
    }

    let image = snapshot(compute, waiter, profile, &instance).await?;
    report.deleted_images = prune_images(compute, waiter, reporter, profile, &image).await?;
    report.image = Some(image);

    if !opts.keep {
        let op = step("delete instance", compute.delete_instance(name, zone).await)?;
        let labels = ProgressLabels::new(
            format!("Destroying instance '{name}' in zone '{zone}'"),
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
        report.instance_deleted = true;
    }

    Ok(report)
}

/// Image the instance's boot disk. Returns the image name reported by the
/// provider.
async fn snapshot(
    compute: &impl ComputeProvider,
    waiter: &OperationWaiter<'_, impl ProgressIndicator, impl InterruptSignal>,
    profile: &Profile,
    instance: &Instance,
) -> Result<String> {
    let name = profile.instance_name.as_str();
    let source_disk = instance
        .boot_disk()
        .ok_or_else(|| WorkflowError::NoBootDisk {
            instance: name.to_owned(),
        })?;
    let image_name = snapshot_image_name(&profile.image_base_name, Utc::now());
    let spec = ImageSpec {
        name: &image_name,
        family: Some(profile.image_family()),
        source_disk,
    };

    let op = step("create image", compute.create_image(&spec).await)?;
    let labels = ProgressLabels::new(
        format!("Creating image from instance '{name}'"),
        format!("Image '{image_name}' created from instance '{name}'"),
    )
    .with_fail(format!("Image of instance '{name}' was not created"));
    let done = waiter
        .run_step(compute, OperationHandle::global(op.name), labels, "create image")
        .await?;

    let created = done
        .target_name()
        .ok_or(WorkflowError::MissingTargetLink)?
        .to_owned();
    tracing::debug!(image = %created, "snapshot image created");
    Ok(created)
}

/// Delete every image of the family except the latest and the one just
/// created. Returns the names deleted.
async fn prune_images(
    compute: &impl ComputeProvider,
    waiter: &OperationWaiter<'_, impl ProgressIndicator, impl InterruptSignal>,
    reporter: &impl ProgressReporter,
    profile: &Profile,
    created: &str,
) -> Result<Vec<String>> {
    let family = profile.image_family();
    let latest = step("find latest image", compute.latest_image(family).await)?
        .map_or_else(|| created.to_owned(), |image| image.name);
    let images = step("list images", compute.list_images(Some(family)).await)?;
    let dangling = dangling_images(&images, &[latest.as_str(), created]);
    if dangling.is_empty() {
        return Ok(dangling);
    }

    let plural = if dangling.len() == 1 { "" } else { "s" };
    reporter.step(&format!("destroying {} dangling image{plural}", dangling.len()));
    for image in &dangling {
        let op = step("delete image", compute.delete_image(image).await)?;
        let labels = ProgressLabels::new(
            format!("Destroying image '{image}'"),
            format!("Image '{image}' destroyed"),
        )
        .with_fail(format!("Image '{image}' was not destroyed"));
        waiter
            .run_step(compute, OperationHandle::global(op.name), labels, "delete image")
            .await?;
    }
    Ok(dangling)
}
