//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::time::Duration;

use thiserror::Error;

// ── Operation polling errors ──────────────────────────────────────────────────

/// Fatal faults raised by the operation poller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("Unsupported operation scope '{scope}': must be 'zone' (with a zone) or 'global'")]
    InvalidScope { scope: String },

    #[error("Operation {operation} timed out after {} seconds", .timeout.as_secs())]
    OperationTimeout {
        operation: String,
        timeout: Duration,
    },

    #[error("Polling operation {operation} failed: {message}")]
    Query { operation: String, message: String },

    #[error("Operation {operation} was already polled to completion")]
    Exhausted { operation: String },
}

/// User cancellation (Ctrl-C) observed while waiting on an operation.
///
/// Deliberately not a `PollError`: it bypasses result normalization and is
/// propagated to the binary, which exits with status 130.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Operation cancelled by user")]
pub struct Interrupted;

// ── Workflow errors ───────────────────────────────────────────────────────────

/// Errors raised by the instance lifecycle workflows.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to {step}: {message}")]
    StepFailed { step: &'static str, message: String },

    #[error("No instance named '{instance}' found in zone '{zone}'")]
    InstanceNotFound { instance: String, zone: String },

    #[error(
        "Instance '{instance}' already exists in zone '{zone}'. Start or connect to the instance"
    )]
    InstanceExists { instance: String, zone: String },

    #[error("Instance '{instance}' found, but not running. Run 'vmlc start' to turn on the VM")]
    NotRunning { instance: String },

    #[error("Instance '{instance}' is {status}. Wait for it to settle and retry")]
    UnexpectedStatus { instance: String, status: String },

    #[error("No image found in family '{family}'. Run 'vmlc create' to create a fresh instance")]
    NoImage { family: String },

    #[error("Instance '{instance}' has no boot disk")]
    NoBootDisk { instance: String },

    #[error("Image creation reported success but returned no target link")]
    MissingTargetLink,

    #[error(
        "The following APIs are not enabled in project '{project}': {}\n\nEnable them with: gcloud services enable {} --project={project}",
        .missing.join(", "),
        .missing.join(" ")
    )]
    ApisDisabled {
        project: String,
        missing: Vec<String>,
    },
}

// ── Profile errors ────────────────────────────────────────────────────────────

/// Errors related to the profile store.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("No active profile. Create one with: vmlc profile create")]
    NoActiveProfile,

    #[error("Profile '{0}' not found.")]
    NotFound(String),

    #[error("Profile '{0}' already exists.")]
    AlreadyExists(String),

    #[error("No profiles found in {0}. Run 'vmlc profile create' to create a profile.")]
    Empty(String),

    #[error("Invalid {field} '{value}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}
