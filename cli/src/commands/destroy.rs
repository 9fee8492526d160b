//! `vmlc destroy`: delete the instance without imaging it.

use std::process::ExitCode;

use anyhow::Result;
use serde_json::json;

use crate::app::AppContext;
use crate::application::services::instance::{DestroyOutcome, destroy_instance};
use crate::output::json::print_json;

/// Run `vmlc destroy`.
///
/// # Errors
///
/// Returns an error if the delete operation fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let (config, _, profile) = app.active_profile()?;
    let compute = app.compute(&profile.project_id).await?;
    let progress = app.progress();
    let waiter = app.waiter(&progress, config.polling.into());

    let outcome = destroy_instance(&compute, &waiter, app, &profile, &profile.zone).await?;
    let name = &profile.instance_name;
    match outcome {
        DestroyOutcome::NotFound => app.output.info(&format!(
            "Instance '{name}' not found in zone '{}'",
            profile.zone
        )),
        DestroyOutcome::Aborted => app.output.info("Aborted."),
        DestroyOutcome::Destroyed => {}
    }
    if app.is_json() {
        print_json(&json!({
            "instance": name,
            "destroyed": outcome == DestroyOutcome::Destroyed,
        }))?;
    }
    Ok(ExitCode::SUCCESS)
}
