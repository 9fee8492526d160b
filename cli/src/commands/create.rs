//! `vmlc create`: create a fresh instance for the active profile.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::application::services::instance::{CreateOptions, CreateOutcome, create_instance};
use crate::commands::remember_zone;
use crate::domain::config::validate_zone;
use crate::output::json::print_json;

/// Arguments for the create command.
#[derive(Args, Default)]
pub struct CreateArgs {
    /// Image in the profile's project to boot from, instead of Ubuntu 22.04
    #[arg(long)]
    pub image: Option<String>,

    /// Startup script; `{instance_user}` is replaced with the profile user
    #[arg(long)]
    pub startup_script: Option<PathBuf>,

    /// Zone to create in, overriding the profile
    #[arg(long)]
    pub zone: Option<String>,
}

/// Run `vmlc create`.
///
/// # Errors
///
/// Returns an error if the instance exists, the startup script cannot be
/// read, or the insert operation fails.
pub async fn run(app: &AppContext, args: &CreateArgs) -> Result<ExitCode> {
    let (config, _, profile) = app.active_profile()?;
    let zone = args.zone.as_deref().unwrap_or(&profile.zone);
    validate_zone(zone)?;

    let script = args
        .startup_script
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("cannot read startup script {}", path.display()))
        })
        .transpose()?;

    let compute = app.compute(&profile.project_id).await?;
    let progress = app.progress();
    let waiter = app.waiter(&progress, config.polling.into());

    let outcome = create_instance(
        &compute,
        &waiter,
        app,
        &app.reporter(),
        &profile,
        CreateOptions {
            zone,
            image: args.image.as_deref(),
            startup_script: script.as_deref(),
        },
    )
    .await?;

    match outcome {
        CreateOutcome::Aborted => {
            app.output.info("Aborted.");
            if app.is_json() {
                print_json(&json!({ "created": false }))?;
            }
        }
        CreateOutcome::Created { instance, zone } => {
            remember_zone(app, &zone)?;
            if app.is_json() {
                print_json(&json!({ "created": true, "instance": instance, "zone": zone }))?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
