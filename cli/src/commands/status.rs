//! `vmlc status`: list instances in the active profile's zone.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::instance::list_zone_instances;
use crate::output::InstanceRow;

/// Run `vmlc status`.
///
/// # Errors
///
/// Returns an error if no profile is active or the instances cannot be
/// listed.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let (_, _, profile) = app.active_profile()?;
    let compute = app.compute(&profile.project_id).await?;
    let instances = list_zone_instances(&compute, &profile.zone).await?;
    let rows: Vec<InstanceRow> = instances.iter().map(InstanceRow::from).collect();
    app.renderer()
        .render_status(&profile.project_id, &profile.zone, &rows)?;
    Ok(ExitCode::SUCCESS)
}
