//! `vmlc profile`: create, show, select and delete profiles.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dialoguer::{Input, Select};
use serde_json::json;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::domain::config::{
    DEFAULT_DISK_SIZE_GB, DEFAULT_MACHINE_TYPE, DEFAULT_ZONE, MACHINE_TYPES,
    validate_disk_size, validate_instance_name, validate_profile_name, validate_project_id,
    validate_zone,
};
use crate::domain::{Profile, ProfileError};
use crate::output::json::print_json;

/// Profile subcommands.
#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Create a profile (prompts for anything not given as a flag)
    Create(CreateProfileArgs),
    /// List profiles and the active one
    Show,
    /// Set the active profile
    Set {
        /// Profile to activate; prompts when omitted
        name: Option<String>,
    },
    /// Delete a profile
    Delete {
        /// Profile to delete; prompts when omitted
        name: Option<String>,
        /// Delete every profile
        #[arg(short, long, conflicts_with = "name")]
        all: bool,
    },
}

/// Arguments for `profile create`.
#[derive(Args, Default)]
pub struct CreateProfileArgs {
    /// Profile name
    #[arg(long)]
    pub name: Option<String>,
    /// GCP project id
    #[arg(long)]
    pub project: Option<String>,
    /// Zone, e.g. europe-west1-b
    #[arg(long)]
    pub zone: Option<String>,
    /// Instance name
    #[arg(long)]
    pub instance: Option<String>,
    /// Login user on the instance
    #[arg(long)]
    pub user: Option<String>,
    /// Machine type
    #[arg(long)]
    pub machine_type: Option<String>,
    /// Boot disk size in GB
    #[arg(long)]
    pub disk_size: Option<u32>,
}

/// Run a profile subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be read or written, a value is
/// invalid, or a prompt fails.
pub fn run(app: &AppContext, cmd: ProfileCommand) -> Result<ExitCode> {
    match cmd {
        ProfileCommand::Create(args) => create(app, args),
        ProfileCommand::Show => show(app),
        ProfileCommand::Set { name } => set(app, name),
        ProfileCommand::Delete { all: true, .. } => delete_all(app),
        ProfileCommand::Delete { name, all: false } => delete(app, name),
    }
}

// ── create ───────────────────────────────────────────────────────────────────

fn create(app: &AppContext, args: CreateProfileArgs) -> Result<ExitCode> {
    if !app.is_json() && !app.non_interactive {
        app.output.header("Create vmlc profile");
    }
    let name = text(app, "Profile name", args.name, None, validate_profile_name)?;
    let project = text(app, "GCP project id", args.project, None, validate_project_id)?;
    let zone = text(
        app,
        "Zone",
        args.zone,
        Some(DEFAULT_ZONE.to_owned()),
        validate_zone,
    )?;
    let instance = text(
        app,
        "Instance name",
        args.instance,
        None,
        validate_instance_name,
    )?;
    let user = text(
        app,
        "Instance user",
        args.user,
        std::env::var("USER").ok(),
        |_| Ok(()),
    )?;
    let machine_type = machine_type(app, args.machine_type)?;
    let disk_size = disk_size(app, args.disk_size)?;

    let profile = Profile::new(&project, &zone, &instance, &user, &machine_type, disk_size);

    let exists = config_service::load_config(&app.config_store)?
        .profiles
        .contains_key(&name);
    if exists && !app.confirm(&format!("Profile '{name}' already exists. Overwrite?"), false)? {
        app.output.info("Aborted.");
        return Ok(ExitCode::FAILURE);
    }

    config_service::add_profile(&app.config_store, &name, profile, exists)?;

    let names = config_service::load_config(&app.config_store)?.profile_names();
    if names.len() > 1 && !app.non_interactive {
        let default = names.iter().position(|n| *n == name).unwrap_or(0);
        let idx = Select::new()
            .with_prompt("Select active profile")
            .items(&names)
            .default(default)
            .interact()
            .context("profile selection")?;
        config_service::set_active(&app.config_store, &names[idx])?;
    }

    let config = config_service::load_config(&app.config_store)?;
    let active = config.active.unwrap_or_default();
    if app.is_json() {
        print_json(&json!({ "profile": name, "active": active }))?;
    } else {
        app.output
            .info(&format!("Saved to {}", app.config_path()?.display()));
        app.output.success(&format!("Profile '{name}' added."));
        app.output
            .success(&format!("Active profile set to '{active}'"));
    }
    Ok(ExitCode::SUCCESS)
}

/// Take `given` if present, otherwise prompt. Both paths are validated.
fn text(
    app: &AppContext,
    prompt: &str,
    given: Option<String>,
    default: Option<String>,
    validate: fn(&str) -> Result<()>,
) -> Result<String> {
    if let Some(value) = given {
        validate(&value)?;
        return Ok(value);
    }
    if app.non_interactive {
        let value = default.ok_or_else(|| {
            anyhow::anyhow!("{prompt} is required when prompts are disabled")
        })?;
        validate(&value)?;
        return Ok(value);
    }
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(value) = default {
        input = input.default(value);
    }
    input
        .validate_with(|value: &String| validate(value).map_err(|e| e.to_string()))
        .interact_text()
        .with_context(|| format!("reading {prompt}"))
}

fn machine_type(app: &AppContext, given: Option<String>) -> Result<String> {
    if let Some(value) = given {
        crate::domain::config::validate_machine_type(&value)?;
        return Ok(value);
    }
    if app.non_interactive {
        return Ok(DEFAULT_MACHINE_TYPE.to_owned());
    }
    let default = MACHINE_TYPES
        .iter()
        .position(|m| *m == DEFAULT_MACHINE_TYPE)
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Machine type")
        .items(MACHINE_TYPES)
        .default(default)
        .interact()
        .context("machine type selection")?;
    Ok(MACHINE_TYPES[idx].to_owned())
}

fn disk_size(app: &AppContext, given: Option<u32>) -> Result<u32> {
    if let Some(size) = given {
        validate_disk_size(size)?;
        return Ok(size);
    }
    if app.non_interactive {
        return Ok(DEFAULT_DISK_SIZE_GB);
    }
    Input::<u32>::new()
        .with_prompt("Disk size (GB)")
        .default(DEFAULT_DISK_SIZE_GB)
        .validate_with(|size: &u32| validate_disk_size(*size).map_err(|e| e.to_string()))
        .interact_text()
        .context("reading disk size")
}

// ── show / set / delete ──────────────────────────────────────────────────────

fn show(app: &AppContext) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    if config.profiles.is_empty() && !app.is_json() {
        return Err(ProfileError::Empty(app.config_path()?.display().to_string()).into());
    }
    app.renderer().render_profiles(&config)?;
    Ok(ExitCode::SUCCESS)
}

fn set(app: &AppContext, name: Option<String>) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let names = config.profile_names();
    if names.is_empty() {
        return Err(ProfileError::Empty(app.config_path()?.display().to_string()).into());
    }
    let name = match name {
        Some(name) => name,
        None => {
            anyhow::ensure!(
                !app.non_interactive,
                "Profile name is required when prompts are disabled"
            );
            let default = config
                .active
                .as_ref()
                .and_then(|active| names.iter().position(|n| n == active))
                .unwrap_or(0);
            let idx = Select::new()
                .with_prompt("Select active profile")
                .items(&names)
                .default(default)
                .interact()
                .context("profile selection")?;
            names[idx].clone()
        }
    };
    config_service::set_active(&app.config_store, &name)?;
    if app.is_json() {
        print_json(&json!({ "active": name }))?;
    } else {
        app.output
            .success(&format!("Active profile set to '{name}'"));
    }
    Ok(ExitCode::SUCCESS)
}

fn delete(app: &AppContext, name: Option<String>) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    let names = config.profile_names();
    let name = match name {
        Some(name) => name,
        None => {
            if names.is_empty() {
                return Err(
                    ProfileError::Empty(app.config_path()?.display().to_string()).into(),
                );
            }
            anyhow::ensure!(
                !app.non_interactive,
                "Profile name is required when prompts are disabled"
            );
            let idx = Select::new()
                .with_prompt("Select profile to delete")
                .items(&names)
                .default(0)
                .interact()
                .context("profile selection")?;
            names[idx].clone()
        }
    };
    if !config.profiles.contains_key(&name) {
        return Err(ProfileError::NotFound(name).into());
    }
    if !app.confirm(&format!("Delete profile '{name}'?"), true)? {
        app.output.info("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }
    config_service::delete_profile(&app.config_store, &name)?;
    if app.is_json() {
        print_json(&json!({ "deleted": [name] }))?;
    } else {
        app.output.success(&format!("Deleted profile '{name}'"));
    }
    Ok(ExitCode::SUCCESS)
}

fn delete_all(app: &AppContext) -> Result<ExitCode> {
    let config = config_service::load_config(&app.config_store)?;
    if config.profiles.is_empty() {
        app.output.info("No profiles to delete.");
        if app.is_json() {
            print_json(&json!({ "deleted": [] }))?;
        }
        return Ok(ExitCode::SUCCESS);
    }
    if !app.confirm("Delete all profiles?", false)? {
        app.output.info("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }
    let names = config.profile_names();
    let count = config_service::delete_all_profiles(&app.config_store)?;
    if app.is_json() {
        print_json(&json!({ "deleted": names }))?;
    } else {
        app.output.success(&format!("Deleted {count} profiles"));
    }
    Ok(ExitCode::SUCCESS)
}
