//! Application context: unified state passed to every command handler.
//!
//! `AppContext` carries the output context, the config store, the process
//! runner and the interrupt source into commands, so no command reaches for
//! process-wide state of its own.

use anyhow::Result;

use crate::application::ports::{ConfigStore, Confirmer};
use crate::application::services::{api_check, config_service};
use crate::application::services::operation::OperationWaiter;
use crate::domain::{PollSettings, Profile, VmlcConfig};
use crate::infra::auth;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::compute::GceClient;
use crate::infra::config::YamlConfigStore;
use crate::infra::interrupt::CtrlCSignal;
use crate::output::{
    HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalProgress, TerminalReporter,
};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `VMLC_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Profile and settings store.
    pub config_store: YamlConfigStore,
    /// Runner for `gcloud` and `code`.
    pub runner: TokioCommandRunner,
    /// Ctrl-C source for operation waits.
    pub interrupt: CtrlCSignal,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `VMLC_YES`
    /// environment variables are present.
    pub non_interactive: bool,
    /// `--yes` was passed: every confirmation is answered yes.
    pub assume_yes: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// Must be called inside the tokio runtime; it installs the Ctrl-C
    /// listener.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("VMLC_YES").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        // JSON mode keeps stdout for the one JSON document.
        let quiet = flags.output.quiet || flags.output.json;

        Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            config_store: YamlConfigStore,
            runner: TokioCommandRunner::default(),
            interrupt: CtrlCSignal::install(),
            non_interactive,
            assume_yes: flags.behaviour.yes,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Step reporter for application services.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Spinner sessions for operation waits.
    #[must_use]
    pub fn progress(&self) -> TerminalProgress {
        TerminalProgress::new(
            self.output.styles.clone(),
            self.output.show_progress(),
            self.output.quiet,
        )
    }

    /// Operation waiter bound to this context's interrupt source.
    #[must_use]
    pub fn waiter<'a>(
        &'a self,
        progress: &'a TerminalProgress,
        settings: PollSettings,
    ) -> OperationWaiter<'a, TerminalProgress, CtrlCSignal> {
        OperationWaiter::new(progress, &self.interrupt, settings)
    }

    /// Load the config and the active profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be read or no profile is active.
    pub fn active_profile(&self) -> Result<(VmlcConfig, String, Profile)> {
        config_service::active_profile(&self.config_store)
    }

    /// Authenticated Compute Engine client for `project`.
    ///
    /// Verifies once per profile that the project has the required APIs
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if no access token can be obtained or a required API
    /// is not enabled.
    pub async fn compute(&self, project: &str) -> Result<GceClient> {
        let token = auth::access_token(&self.runner).await?;
        let client = GceClient::new(project, token)?;
        api_check::ensure_required_apis(&self.config_store, &client).await?;
        Ok(client)
    }

    /// Location of the config file, for messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path(&self) -> Result<std::path::PathBuf> {
        self.config_store.path()
    }

    /// Ask the user for confirmation.
    ///
    /// `--yes` answers `true`. Otherwise, when `non_interactive` is set by
    /// `CI` or `VMLC_YES`, returns `default` without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}

impl Confirmer for AppContext {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        AppContext::confirm(self, prompt, default)
    }
}
