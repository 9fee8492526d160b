//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::process::Output;

use anyhow::Result;

use crate::domain::{Image, Instance, Operation, OperationHandle, VmlcConfig};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Parameters for inserting a new VM instance.
pub struct InstanceSpec<'a> {
    /// Instance name.
    pub name: &'a str,
    /// Zone to create the instance in, e.g. `"europe-west1-b"`.
    pub zone: &'a str,
    /// Machine type short name, e.g. `"e2-standard-4"`.
    pub machine_type: &'a str,
    /// Boot disk size in GB.
    pub disk_size_gb: u32,
    /// Boot image path, e.g. `projects/<p>/global/images/<name>`.
    pub source_image: &'a str,
    /// Rendered startup script, attached as instance metadata.
    pub startup_script: Option<&'a str>,
}

/// Parameters for snapshotting a disk into an image.
pub struct ImageSpec<'a> {
    /// Image name.
    pub name: &'a str,
    /// Image family the image is filed under.
    pub family: Option<&'a str>,
    /// Source disk URL.
    pub source_disk: &'a str,
}

// ── Compute Port Traits ───────────────────────────────────────────────────────

/// Instance lifecycle mutations. Every call returns the provider operation
/// tracking the change.
#[allow(async_fn_in_trait)]
pub trait InstanceLifecycle {
    /// Insert a new instance.
    async fn insert_instance(&self, spec: &InstanceSpec<'_>) -> Result<Operation>;
    /// Start a stopped instance.
    async fn start_instance(&self, name: &str, zone: &str) -> Result<Operation>;
    /// Stop a running instance.
    async fn stop_instance(&self, name: &str, zone: &str) -> Result<Operation>;
    /// Delete an instance.
    async fn delete_instance(&self, name: &str, zone: &str) -> Result<Operation>;
}

/// Read-only instance queries.
#[allow(async_fn_in_trait)]
pub trait InstanceInspector {
    /// List instances in a zone.
    async fn list_instances(&self, zone: &str) -> Result<Vec<Instance>>;
    /// Fetch one instance, `None` if it does not exist.
    async fn get_instance(&self, name: &str, zone: &str) -> Result<Option<Instance>>;
}

/// Image queries and mutations.
#[allow(async_fn_in_trait)]
pub trait ImageStore {
    /// Create an image from a disk.
    async fn create_image(&self, spec: &ImageSpec<'_>) -> Result<Operation>;
    /// Delete an image.
    async fn delete_image(&self, name: &str) -> Result<Operation>;
    /// List project images, optionally restricted to one family.
    async fn list_images(&self, family: Option<&str>) -> Result<Vec<Image>>;
    /// Latest non-deprecated image of a family, `None` if the family is empty.
    async fn latest_image(&self, family: &str) -> Result<Option<Image>>;
}

/// Operation status queries.
#[allow(async_fn_in_trait)]
pub trait OperationTracker {
    /// Fetch the current state of an operation. Read-only.
    async fn get_operation(&self, handle: &OperationHandle) -> Result<Operation>;
}

/// Composite trait: any type implementing all four sub-traits is a `ComputeProvider`.
pub trait ComputeProvider:
    InstanceLifecycle + InstanceInspector + ImageStore + OperationTracker
{
}

/// Blanket implementation: any type implementing all four sub-traits is a `ComputeProvider`.
impl<T> ComputeProvider for T where
    T: InstanceLifecycle + InstanceInspector + ImageStore + OperationTracker
{
}

/// Project service (API) enablement queries.
#[allow(async_fn_in_trait)]
pub trait ServiceUsage {
    /// Names of the services enabled in the project, e.g.
    /// `compute.googleapis.com`.
    async fn enabled_services(&self) -> Result<Vec<String>>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Progress Reporting Ports ──────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

/// Labels for one progress session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressLabels {
    /// Shown next to the spinner while the operation runs.
    pub text: String,
    /// Final line on success.
    pub done: String,
    /// Final line on failure.
    pub fail: String,
    /// Expected upper bound in seconds; only widens the elapsed counter.
    pub max_secs: Option<u64>,
}

impl ProgressLabels {
    pub fn new(text: impl Into<String>, done: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: done.into(),
            fail: "Operation failed".to_string(),
            max_secs: None,
        }
    }

    #[must_use]
    pub fn with_fail(mut self, fail: impl Into<String>) -> Self {
        self.fail = fail.into();
        self
    }

    #[must_use]
    pub fn with_max_secs(mut self, max_secs: u64) -> Self {
        self.max_secs = Some(max_secs);
        self
    }

    /// Column width that fits every label, so the line never jitters.
    #[must_use]
    pub fn width(&self) -> usize {
        [&self.text, &self.done, &self.fail]
            .iter()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0)
    }
}

/// How a progress session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

/// One running progress session. Finishing consumes it; dropping an
/// unfinished session must behave like `finish(SessionOutcome::Failed)`.
pub trait ProgressSession {
    /// Stop the animation and write the final line for `outcome`.
    fn finish(self, outcome: SessionOutcome);
}

/// Starts progress sessions.
pub trait ProgressIndicator {
    type Session: ProgressSession;
    /// Start animating `labels.text` until the returned session is finished.
    fn begin(&self, labels: ProgressLabels) -> Self::Session;
}

/// Source of user interrupts (Ctrl-C).
#[allow(async_fn_in_trait)]
pub trait InterruptSignal {
    /// Resolves when the user asks to cancel.
    async fn interrupted(&self);
}

/// Asks the user a yes/no question.
pub trait Confirmer {
    /// Returns `default` without prompting in non-interactive mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, returning defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<VmlcConfig>;
    /// Persist the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &VmlcConfig) -> Result<()>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
