//! Domain types and validators for vmlc configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::{ConfigError, ProfileError};
use crate::domain::instance::region_from_zone;
use crate::domain::operation::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PollSettings};

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &["polling.timeout_secs", "polling.interval_secs"];

/// Machine types offered when creating a profile.
pub const MACHINE_TYPES: &[&str] = &[
    "e2-medium",
    "e2-standard-2",
    "e2-standard-4",
    "n1-standard-1",
    "n1-standard-2",
    "n2-standard-2",
    "n2-standard-4",
];

/// Services a project must have enabled before any workflow runs.
pub const REQUIRED_APIS: &[&str] = &["compute.googleapis.com"];

/// Floor for both poll timings; a zero interval would query without pause.
pub const MIN_POLL_SECS: u64 = 1;

pub const DEFAULT_ZONE: &str = "europe-west1-b";
pub const DEFAULT_MACHINE_TYPE: &str = "e2-standard-4";
pub const DEFAULT_DISK_SIZE_GB: u32 = 100;

const MIN_DISK_SIZE_GB: u32 = 10;
const MAX_DISK_SIZE_GB: u32 = 65_536;

static PROFILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_-]{1,32}$").expect("valid regex")
});

static INSTANCE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z]([-a-z0-9]{0,61}[a-z0-9])?$").expect("valid regex")
});

static PROJECT_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$").expect("valid regex")
});

static ZONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z]+-[a-z]+[0-9]+-[a-z]$").expect("valid regex")
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `<config dir>/vmlc/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmlcConfig {
    /// Name of the active profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    /// Operation polling settings.
    pub polling: PollingConfig,
    /// Named profiles.
    pub profiles: BTreeMap<String, Profile>,
}

/// One project/zone/instance binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub project_id: String,
    pub zone: String,
    pub region: String,
    pub instance_name: String,
    pub instance_user: String,
    pub machine_type: String,
    pub disk_size: u32,
    pub image_base_name: String,
    /// Set once the required APIs were found enabled in the project.
    #[serde(default)]
    pub api_cache: bool,
}

impl Profile {
    /// Build a profile, deriving `region` and `image_base_name`.
    #[must_use]
    pub fn new(
        project_id: &str,
        zone: &str,
        instance_name: &str,
        instance_user: &str,
        machine_type: &str,
        disk_size: u32,
    ) -> Self {
        Self {
            project_id: project_id.to_owned(),
            zone: zone.to_owned(),
            region: region_from_zone(zone),
            instance_name: instance_name.to_owned(),
            instance_user: instance_user.to_owned(),
            machine_type: machine_type.to_owned(),
            disk_size,
            image_base_name: format!("{instance_name}-image"),
            api_cache: false,
        }
    }

    /// Image family snapshots of this profile's instance are filed under.
    #[must_use]
    pub fn image_family(&self) -> &str {
        &self.image_base_name
    }

    /// Validate every user-supplied field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<()> {
        validate_project_id(&self.project_id)?;
        validate_zone(&self.zone)?;
        validate_instance_name(&self.instance_name)?;
        validate_machine_type(&self.machine_type)?;
        validate_disk_size(self.disk_size)?;
        Ok(())
    }
}

/// Poll timing stored in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub timeout_secs: u64,
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_POLL_TIMEOUT.as_secs(),
            interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

impl From<PollingConfig> for PollSettings {
    fn from(cfg: PollingConfig) -> Self {
        Self {
            timeout: Duration::from_secs(cfg.timeout_secs.max(MIN_POLL_SECS)),
            interval: Duration::from_secs(cfg.interval_secs.max(MIN_POLL_SECS)),
        }
    }
}

impl VmlcConfig {
    /// The active profile and its name.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NoActiveProfile` when no profile is active or
    /// the active name points at a missing profile.
    pub fn active_profile(&self) -> Result<(&str, &Profile), ProfileError> {
        let name = self.active.as_deref().ok_or(ProfileError::NoActiveProfile)?;
        let profile = self.profiles.get(name).ok_or(ProfileError::NoActiveProfile)?;
        Ok((name, profile))
    }

    /// Add a profile. The first profile added becomes active.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::AlreadyExists` if the name is taken and
    /// `overwrite` is false.
    pub fn add_profile(
        &mut self,
        name: &str,
        profile: Profile,
        overwrite: bool,
    ) -> Result<(), ProfileError> {
        if self.profiles.contains_key(name) && !overwrite {
            return Err(ProfileError::AlreadyExists(name.to_owned()));
        }
        self.profiles.insert(name.to_owned(), profile);
        if self.active.is_none() {
            self.active = Some(name.to_owned());
        }
        Ok(())
    }

    /// Make `name` the active profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` for an unknown profile.
    pub fn set_active(&mut self, name: &str) -> Result<(), ProfileError> {
        if !self.profiles.contains_key(name) {
            return Err(ProfileError::NotFound(name.to_owned()));
        }
        self.active = Some(name.to_owned());
        Ok(())
    }

    /// Remove a profile, clearing `active` if it pointed at it.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` for an unknown profile.
    pub fn delete_profile(&mut self, name: &str) -> Result<Profile, ProfileError> {
        let removed = self
            .profiles
            .remove(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_owned()))?;
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        Ok(removed)
    }

    /// Remove every profile. Polling settings are kept.
    pub fn delete_all_profiles(&mut self) {
        self.profiles.clear();
        self.active = None;
    }

    /// Record a zone change on the active profile, re-deriving the region.
    ///
    /// Returns `true` if the profile changed.
    pub fn update_active_zone(&mut self, zone: &str) -> bool {
        let Some(name) = self.active.clone() else {
            return false;
        };
        match self.profiles.get_mut(&name) {
            Some(profile) if profile.zone != zone => {
                profile.zone = zone.to_owned();
                profile.region = region_from_zone(zone);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }
}

/// Entries of [`REQUIRED_APIS`] absent from `enabled`.
#[must_use]
pub fn missing_apis(enabled: &[String]) -> Vec<String> {
    REQUIRED_APIS
        .iter()
        .filter(|api| !enabled.iter().any(|e| e == *api))
        .map(|api| (*api).to_owned())
        .collect()
}

// ── Validators ───────────────────────────────────────────────────────────────

fn invalid(field: &'static str, value: &str, reason: &'static str) -> anyhow::Error {
    ProfileError::InvalidField {
        field,
        value: value.to_owned(),
        reason,
    }
    .into()
}

/// # Errors
///
/// Returns an error if the name is not 1–32 letters, digits, `-` or `_`.
pub fn validate_profile_name(name: &str) -> Result<()> {
    if PROFILE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(invalid(
            "profile name",
            name,
            "use 1-32 letters, digits, '-' or '_'",
        ))
    }
}

/// # Errors
///
/// Returns an error if the name is not a valid Compute Engine resource name.
pub fn validate_instance_name(name: &str) -> Result<()> {
    if INSTANCE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(invalid(
            "instance name",
            name,
            "must start with a lowercase letter and contain only lowercase letters, digits or '-' (max 63)",
        ))
    }
}

/// # Errors
///
/// Returns an error if the id is not a valid GCP project id.
pub fn validate_project_id(id: &str) -> Result<()> {
    if PROJECT_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(invalid(
            "project id",
            id,
            "must be 6-30 lowercase letters, digits or '-', starting with a letter",
        ))
    }
}

/// # Errors
///
/// Returns an error if the zone does not look like `europe-west1-b`.
pub fn validate_zone(zone: &str) -> Result<()> {
    if ZONE_RE.is_match(zone) {
        Ok(())
    } else {
        Err(invalid("zone", zone, "expected a zone such as europe-west1-b"))
    }
}

/// # Errors
///
/// Returns an error if the machine type is not offered.
pub fn validate_machine_type(machine_type: &str) -> Result<()> {
    if MACHINE_TYPES.contains(&machine_type) {
        Ok(())
    } else {
        Err(invalid(
            "machine type",
            machine_type,
            "not a supported machine type",
        ))
    }
}

/// # Errors
///
/// Returns an error if the size is outside 10–65536 GB.
pub fn validate_disk_size(size: u32) -> Result<()> {
    if (MIN_DISK_SIZE_GB..=MAX_DISK_SIZE_GB).contains(&size) {
        Ok(())
    } else {
        Err(invalid(
            "disk size",
            &size.to_string(),
            "must be between 10 and 65536 GB",
        ))
    }
}

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key and parses it.
///
/// # Errors
///
/// Returns an error if the value is not a positive number of seconds.
pub fn validate_config_value(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "Expected a positive number of seconds".to_string(),
        }
        .into()),
    }
}

/// Apply a validated key/value to the polling settings.
///
/// # Errors
///
/// Returns an error for an unknown key or an invalid value.
pub fn apply_config_value(config: &mut VmlcConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    let secs = validate_config_value(key, value)?;
    match key {
        "polling.timeout_secs" => config.polling.timeout_secs = secs,
        "polling.interval_secs" => config.polling.interval_secs = secs,
        _ => anyhow::bail!("Unknown setting: {key}"),
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
