//! Command implementations

pub mod config;
pub mod connect;
pub mod create;
pub mod destroy;
pub mod profile;
pub mod start;
pub mod status;
pub mod stop;
pub mod version;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::config_service;

/// Remember `zone` as the active profile's zone after an override.
///
/// # Errors
///
/// Returns an error if the config cannot be saved.
pub(crate) fn remember_zone(app: &AppContext, zone: &str) -> Result<()> {
    if config_service::update_active_zone(&app.config_store, zone)? {
        app.output
            .info(&format!("Profile zone updated to '{zone}'"));
    }
    Ok(())
}
