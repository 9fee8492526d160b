//! `vmlc connect`: open VS Code Remote-SSH on the running instance.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::application::services::connect::connect;
use crate::output::json::print_json;

/// Arguments for the connect command.
#[derive(Args, Default)]
pub struct ConnectArgs {
    /// Remote folder to open (default: the instance user's home)
    #[arg(long)]
    pub path: Option<String>,
}

/// Run `vmlc connect`.
///
/// # Errors
///
/// Returns an error if the instance is not running or `gcloud` / `code`
/// fail.
pub async fn run(app: &AppContext, args: &ConnectArgs) -> Result<ExitCode> {
    let (_, _, profile) = app.active_profile()?;
    let compute = app.compute(&profile.project_id).await?;
    let uri = connect(
        &compute,
        &app.runner,
        &app.reporter(),
        &profile,
        args.path.as_deref(),
    )
    .await?;

    if app.is_json() {
        print_json(&json!({ "uri": uri }))?;
    } else {
        app.output.success("VS Code opened");
    }
    Ok(ExitCode::SUCCESS)
}
