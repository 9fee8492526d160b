//! `vmlc start`: start the instance, recreating it from its latest image
//! when it was deleted by `stop`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::application::services::instance::{StartOutcome, start_instance};
use crate::commands::remember_zone;
use crate::domain::config::validate_zone;
use crate::output::json::print_json;

/// Arguments for the start command.
#[derive(Args, Default)]
pub struct StartArgs {
    /// Zone to start in, overriding the profile
    #[arg(long)]
    pub zone: Option<String>,
}

/// Run `vmlc start`.
///
/// # Errors
///
/// Returns an error if there is neither an instance nor an image to start
/// from, or an operation fails.
pub async fn run(app: &AppContext, args: &StartArgs) -> Result<ExitCode> {
    let (config, _, profile) = app.active_profile()?;
    let zone = args.zone.as_deref().unwrap_or(&profile.zone);
    validate_zone(zone)?;

    let compute = app.compute(&profile.project_id).await?;
    let progress = app.progress();
    let waiter = app.waiter(&progress, config.polling.into());

    let outcome = start_instance(&compute, &waiter, &app.reporter(), &profile, zone).await?;

    let name = &profile.instance_name;
    let (state, image) = match &outcome {
        StartOutcome::AlreadyRunning => {
            app.output
                .info(&format!("Instance '{name}' is already running in zone '{zone}'"));
            ("running", None)
        }
        StartOutcome::Started => ("started", None),
        StartOutcome::CreatedFromImage { image } => ("created", Some(image.as_str())),
    };
    if outcome.changed() {
        remember_zone(app, zone)?;
    }
    if app.is_json() {
        print_json(&json!({
            "instance": name,
            "zone": zone,
            "state": state,
            "image": image,
        }))?;
    }
    Ok(ExitCode::SUCCESS)
}
