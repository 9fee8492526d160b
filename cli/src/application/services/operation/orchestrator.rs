//! Poll orchestrator: waits on an operation under a progress session and
//! normalizes every outcome into a [`PollOutcome`].
//!
//! This is the only boundary where poller faults become results. Workflows
//! see either a `PollOutcome` or a propagated [`Interrupted`].

use crate::application::ports::{
    InterruptSignal, OperationTracker, ProgressIndicator, ProgressLabels, ProgressSession,
    SessionOutcome,
};
use crate::application::services::operation::poller::Poller;
use crate::domain::{
    Interrupted, Operation, OperationHandle, PollError, PollOutcome, PollSettings, WorkflowError,
};

/// Waits on provider operations with visible progress.
pub struct OperationWaiter<'a, P, S> {
    progress: &'a P,
    interrupt: &'a S,
    settings: PollSettings,
}

impl<'a, P: ProgressIndicator, S: InterruptSignal> OperationWaiter<'a, P, S> {
    pub fn new(progress: &'a P, interrupt: &'a S, settings: PollSettings) -> Self {
        Self {
            progress,
            interrupt,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Poll `handle` to completion while a progress session is shown.
    ///
    /// Never retries. A successful outcome is returned as-is even if the
    /// payload lacks fields the caller needs.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the user cancels while polling; the session
    /// shows a cancellation notice and no outcome is produced.
    pub async fn wait(
        &self,
        tracker: &impl OperationTracker,
        handle: OperationHandle,
        labels: ProgressLabels,
    ) -> Result<PollOutcome, Interrupted> {
        let labels = match self.settings.timeout.as_secs() {
            0 => labels,
            secs if labels.max_secs.is_none() => labels.with_max_secs(secs),
            _ => labels,
        };
        let session = self.progress.begin(labels);
        let mut poller = Poller::new(tracker, handle, self.settings);

        let drained = tokio::select! {
            biased;
            () = self.interrupt.interrupted() => None,
            result = poller.drain() => Some(result),
        };

        let Some(result) = drained else {
            tracing::info!(
                operation = poller.handle().name(),
                queries = poller.queries(),
                "poll cancelled by user"
            );
            session.finish(SessionOutcome::Cancelled);
            return Err(Interrupted);
        };

        let outcome = normalize(result);
        if let Some(error) = outcome.error() {
            tracing::debug!(
                operation = poller.handle().name(),
                error = %error.message(),
                "operation failed"
            );
        }
        session.finish(if outcome.success() {
            SessionOutcome::Succeeded
        } else {
            SessionOutcome::Failed
        });
        Ok(outcome)
    }

    /// Wait on `handle` and require success, as one workflow step.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` on user cancellation and
    /// `WorkflowError::StepFailed` when the operation fails.
    pub async fn run_step(
        &self,
        tracker: &impl OperationTracker,
        handle: OperationHandle,
        labels: ProgressLabels,
        step: &'static str,
    ) -> anyhow::Result<Operation> {
        let outcome = self.wait(tracker, handle, labels).await?;
        Ok(require_success(outcome, step)?)
    }
}

/// Unwrap a successful outcome, or fail the workflow `step` with the
/// normalized error message.
///
/// # Errors
///
/// Returns `WorkflowError::StepFailed` for any failed outcome.
pub fn require_success(outcome: PollOutcome, step: &'static str) -> Result<Operation, WorkflowError> {
    match outcome {
        PollOutcome::Succeeded(operation) => Ok(operation),
        PollOutcome::Failed { error, .. } => Err(WorkflowError::StepFailed {
            step,
            message: error.message(),
        }),
    }
}

/// Fold a poller result into the single outcome shape.
fn normalize(result: Result<crate::domain::PollResult, PollError>) -> PollOutcome {
    match result {
        Ok(result) => PollOutcome::from(result),
        Err(e) => PollOutcome::fault(e.to_string()),
    }
}
