//! `create` workflow: insert a fresh instance for the active profile.

use anyhow::Result;

use crate::application::ports::{
    ComputeProvider, Confirmer, InstanceSpec, InterruptSignal, ProgressIndicator,
    ProgressLabels, ProgressReporter,
};
use crate::application::services::instance::{find_profile_instance, step};
use crate::application::services::operation::OperationWaiter;
use crate::domain::instance::{render_startup_script, source_image};
use crate::domain::{OperationHandle, Profile, WorkflowError};

/// Inputs of the `create` workflow beyond the profile.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateOptions<'a> {
    /// Zone to create in; the profile zone unless overridden.
    pub zone: &'a str,
    /// Custom image in the profile's project, instead of the public Ubuntu family.
    pub image: Option<&'a str>,
    /// Startup script template; `{instance_user}` is substituted.
    pub startup_script: Option<&'a str>,
}

/// Result of the `create` workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The instance was created and the insert operation succeeded.
    Created { instance: String, zone: String },
    /// The user declined to create alongside existing snapshots.
    Aborted,
}

/// Create the profile's instance in `opts.zone`.
///
/// # Errors
///
/// Returns `WorkflowError::InstanceExists` if the instance is already there,
/// `Interrupted` on Ctrl-C, and `WorkflowError::StepFailed` if the insert
/// call or its operation fails.
pub async fn create_instance(
    compute: &impl ComputeProvider,
    waiter: &OperationWaiter<'_, impl ProgressIndicator, impl InterruptSignal>,
    confirmer: &impl Confirmer,
    reporter: &impl ProgressReporter,
    profile: &Profile,
    opts: CreateOptions<'_>,
) -> Result<CreateOutcome> {
    let name = profile.instance_name.as_str();
    let zone = opts.zone;

    if find_profile_instance(compute, profile, zone).await?.is_some() {
        return Err(WorkflowError::InstanceExists {
            instance: name.to_owned(),
            zone: zone.to_owned(),
        }
        .into());
    }

    let images = step(
        "list images",
        compute.list_images(Some(profile.image_family())).await,
    )?;
    if !images.is_empty() {
        let count = images.len();
        let plural = if count == 1 { "" } else { "s" };
        let prompt = format!(
            "{count} image{plural} exist for instance '{name}'. Create a new instance anyway?"
        );
        if !confirmer.confirm(&prompt, false)? {
            return Ok(CreateOutcome::Aborted);
        }
    }

    let source = source_image(&profile.project_id, opts.image);
    let script = opts
        .startup_script
        .map(|template| render_startup_script(template, &profile.instance_user));
    let spec = InstanceSpec {
        name,
        zone,
        machine_type: &profile.machine_type,
        disk_size_gb: profile.disk_size,
        source_image: &source,
        startup_script: script.as_deref(),
    };

    reporter.step(&format!("creating instance from {source}"));
    let op = step("create instance", compute.insert_instance(&spec).await)?;
    let labels = ProgressLabels::new(
        format!("Creating instance '{name}' in zone '{zone}'"),
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

    Ok(CreateOutcome::Created {
        instance: name.to_owned(),
        zone: zone.to_owned(),
    })
}
