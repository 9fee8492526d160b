//! Application service: profile and settings use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::apply_config_value;
use crate::domain::{Profile, ProfileError, VmlcConfig};

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<VmlcConfig> {
    store.load()
}

/// Load the config and return the active profile with its name.
///
/// # Errors
///
/// Returns `ProfileError::NoActiveProfile` when none is active.
pub fn active_profile(store: &impl ConfigStore) -> Result<(VmlcConfig, String, Profile)> {
    let config = store.load()?;
    let (name, profile) = config.active_profile()?;
    let (name, profile) = (name.to_owned(), profile.clone());
    Ok((config, name, profile))
}

/// Validate and store a profile. Returns `true` if it became the active one.
///
/// # Errors
///
/// Returns a validation error, or `ProfileError::AlreadyExists` when the name
/// is taken and `overwrite` is false.
pub fn add_profile(
    store: &impl ConfigStore,
    name: &str,
    profile: Profile,
    overwrite: bool,
) -> Result<bool> {
    crate::domain::config::validate_profile_name(name)?;
    profile.validate()?;
    let mut config = store.load()?;
    config.add_profile(name, profile, overwrite)?;
    store.save(&config)?;
    tracing::info!(profile = name, "profile saved");
    Ok(config.active.as_deref() == Some(name))
}

/// Make `name` the active profile.
///
/// # Errors
///
/// Returns `ProfileError::NotFound` for an unknown name.
pub fn set_active(store: &impl ConfigStore, name: &str) -> Result<()> {
    let mut config = store.load()?;
    config.set_active(name)?;
    store.save(&config)
}

/// Delete one profile.
///
/// # Errors
///
/// Returns `ProfileError::NotFound` for an unknown name.
pub fn delete_profile(store: &impl ConfigStore, name: &str) -> Result<()> {
    let mut config = store.load()?;
    config.delete_profile(name)?;
    store.save(&config)
}

/// Delete every profile. Returns how many were removed.
///
/// # Errors
///
/// Returns `ProfileError::Empty` when there is nothing to delete.
pub fn delete_all_profiles(store: &impl ConfigStore) -> Result<usize> {
    let mut config = store.load()?;
    let count = config.profiles.len();
    if count == 0 {
        return Err(ProfileError::Empty(store.path()?.display().to_string()).into());
    }
    config.delete_all_profiles();
    store.save(&config)?;
    Ok(count)
}

/// Record that the active profile's instance now lives in `zone`.
/// Returns `true` if the profile changed.
///
/// # Errors
///
/// Returns an error if the config cannot be saved.
pub fn update_active_zone(store: &impl ConfigStore, zone: &str) -> Result<bool> {
    let mut config = store.load()?;
    if !config.update_active_zone(zone) {
        return Ok(false);
    }
    store.save(&config)?;
    Ok(true)
}

/// Validate and apply one `config set` key/value.
///
/// # Errors
///
/// Returns an error for an unknown key or an invalid value.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<VmlcConfig> {
    let mut config = store.load()?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config)?;
    Ok(config)
}
