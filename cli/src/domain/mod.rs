//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod instance;
pub mod operation;

pub use config::{PollingConfig, Profile, VmlcConfig};
pub use error::{ConfigError, Interrupted, PollError, ProfileError, WorkflowError};
pub use instance::{Image, Instance, InstanceStatus};
pub use operation::{
    Operation, OperationFailure, OperationHandle, OperationScope, PollOutcome, PollResult,
    PollSettings,
};
