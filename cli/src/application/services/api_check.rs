//! Application service: required API check for the active profile's project.
//!
//! A project that passed once is remembered on its profile (`api_cache`), so
//! the check costs one request per profile rather than one per command.

use anyhow::{Context, Result};

use crate::application::ports::{ConfigStore, ServiceUsage};
use crate::domain::WorkflowError;
use crate::domain::config::missing_apis;

/// Fail unless every required API is enabled in the active profile's
/// project. A pass is cached on the profile.
///
/// # Errors
///
/// Returns `WorkflowError::ApisDisabled` naming the missing APIs, or an error
/// if the enabled services cannot be listed or the config cannot be saved.
pub async fn ensure_required_apis(
    store: &impl ConfigStore,
    services: &impl ServiceUsage,
) -> Result<()> {
    let mut config = store.load()?;
    let (name, profile) = config.active_profile()?;
    if profile.api_cache {
        tracing::debug!(profile = name, "required APIs already verified");
        return Ok(());
    }
    let (name, project) = (name.to_owned(), profile.project_id.clone());

    let enabled = services
        .enabled_services()
        .await
        .context("cannot list enabled APIs")?;
    let missing = missing_apis(&enabled);
    if !missing.is_empty() {
        return Err(WorkflowError::ApisDisabled { project, missing }.into());
    }

    if let Some(profile) = config.profiles.get_mut(&name) {
        profile.api_cache = true;
    }
    store.save(&config)?;
    tracing::info!(profile = %name, %project, "required APIs enabled");
    Ok(())
}
