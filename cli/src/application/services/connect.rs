//! `connect` use-case: register SSH hosts and open VS Code on the instance.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, InstanceInspector, ProgressReporter};
use crate::application::services::instance::find_profile_instance;
use crate::domain::instance::vscode_remote_uri;
use crate::domain::{InstanceStatus, Profile, WorkflowError};

/// Remote folder opened when none is given: the instance user's home.
#[must_use]
pub fn default_remote_path(profile: &Profile) -> String {
    format!("/home/{}", profile.instance_user)
}

/// Open VS Code on the running instance. Returns the remote URI opened.
///
/// # Errors
///
/// Returns `WorkflowError::InstanceNotFound` / `NotRunning` when the instance
/// is unavailable, and `WorkflowError::StepFailed` if `gcloud` or `code`
/// fails.
pub async fn connect(
    compute: &impl InstanceInspector,
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
    profile: &Profile,
    path: Option<&str>,
) -> Result<String> {
    let name = profile.instance_name.as_str();
    let zone = profile.zone.as_str();

    let instance = find_profile_instance(compute, profile, zone)
        .await?
        .ok_or_else(|| WorkflowError::InstanceNotFound {
            instance: name.to_owned(),
            zone: zone.to_owned(),
        })?;
    anyhow::ensure!(
        instance.status() == InstanceStatus::Running,
        WorkflowError::NotRunning {
            instance: name.to_owned(),
        }
    );

    reporter.step("updating SSH configuration");
    let project_flag = format!("--project={}", profile.project_id);
    let output = runner
        .run("gcloud", &["compute", "config-ssh", &project_flag])
        .await
        .context("gcloud CLI not found. Install the Google Cloud SDK")?;
    if !output.status.success() {
        return Err(WorkflowError::StepFailed {
            step: "configure SSH",
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        }
        .into());
    }

    let remote_path = path.map_or_else(|| default_remote_path(profile), str::to_owned);
    let uri = vscode_remote_uri(name, zone, &profile.project_id, &remote_path);
    reporter.step(&format!("opening {uri}"));
    let status = runner
        .run_status("code", &["--folder-uri", &uri])
        .await
        .context("VS Code CLI 'code' not found on PATH")?;
    if !status.success() {
        return Err(WorkflowError::StepFailed {
            step: "open VS Code",
            message: format!("code exited with {status}"),
        }
        .into());
    }
    Ok(uri)
}
