//! `vmlc stop`: stop the instance, image its disk and delete it.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::application::services::instance::{StopOptions, stop_instance};
use crate::output::json::print_json;

/// Arguments for the stop command.
#[derive(Args, Default)]
pub struct StopArgs {
    /// Keep the instance after imaging it
    #[arg(long)]
    pub keep: bool,

    /// Only stop the instance; no image, no deletion
    #[arg(long)]
    pub basic: bool,
}

/// Run `vmlc stop`.
///
/// # Errors
///
/// Returns an error if the instance does not exist or any step fails.
pub async fn run(app: &AppContext, args: &StopArgs) -> Result<ExitCode> {
    let (config, _, profile) = app.active_profile()?;
    let compute = app.compute(&profile.project_id).await?;
    let progress = app.progress();
    let waiter = app.waiter(&progress, config.polling.into());

    let report = stop_instance(
        &compute,
        &waiter,
        &app.reporter(),
        &profile,
        &profile.zone,
        StopOptions {
            keep: args.keep,
            basic: args.basic,
        },
    )
    .await?;

    if app.is_json() {
        print_json(&json!({
            "instance": profile.instance_name,
            "zone": profile.zone,
            "stopped": report.stopped,
            "image": report.image,
            "deleted_images": report.deleted_images,
            "instance_deleted": report.instance_deleted,
        }))?;
    }
    Ok(ExitCode::SUCCESS)
}
