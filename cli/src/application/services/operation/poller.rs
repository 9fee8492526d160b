//! Operation poller: queries an operation until it is `DONE` or times out.
//!
//! The poller is an explicit state machine. Each call to [`Poller::next_event`]
//! issues at most one status query and yields either a `Pending` marker or
//! the terminal `Done` result; after `Done` (or a fault) the sequence is
//! exhausted.

use tokio::time::Instant;

use crate::application::ports::OperationTracker;
use crate::domain::{OperationHandle, PollError, PollResult, PollSettings};

/// One step of the poll sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// The operation is still in flight; carries the observed status.
    Pending { status: String },
    /// The operation reached `DONE`.
    Done(PollResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollerState {
    /// No query issued yet.
    Ready,
    /// Last query was non-terminal; sleep before the next one.
    Waiting,
    Finished,
}

/// Lazy, finite, non-restartable sequence of poll events for one operation.
pub struct Poller<'a, T> {
    tracker: &'a T,
    handle: OperationHandle,
    settings: PollSettings,
    started: Option<Instant>,
    queries: u32,
    state: PollerState,
}

impl<'a, T: OperationTracker> Poller<'a, T> {
    pub fn new(tracker: &'a T, handle: OperationHandle, settings: PollSettings) -> Self {
        Self {
            tracker,
            handle,
            settings,
            started: None,
            queries: 0,
            state: PollerState::Ready,
        }
    }

    /// Operation being polled.
    #[must_use]
    pub fn handle(&self) -> &OperationHandle {
        &self.handle
    }

    /// Number of status queries issued so far.
    #[must_use]
    pub fn queries(&self) -> u32 {
        self.queries
    }

    /// Advance the sequence by one status query.
    ///
    /// Returns `Ok(None)` once the sequence is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `PollError::OperationTimeout` when the timeout elapses before
    /// `DONE`, and `PollError::Query` when the status query itself fails.
    /// Either ends the sequence.
    pub async fn next_event(&mut self) -> Result<Option<PollEvent>, PollError> {
        match self.state {
            PollerState::Finished => return Ok(None),
            PollerState::Waiting => tokio::time::sleep(self.settings.interval).await,
            PollerState::Ready => {}
        }
        let started = *self.started.get_or_insert_with(Instant::now);

        self.queries += 1;
        let operation = match self.tracker.get_operation(&self.handle).await {
            Ok(op) => op,
            Err(e) => {
                self.state = PollerState::Finished;
                return Err(PollError::Query {
                    operation: self.handle.name().to_owned(),
                    message: format!("{e:#}"),
                });
            }
        };
        tracing::debug!(
            operation = self.handle.name(),
            scope = self.handle.scope().kind(),
            status = %operation.status,
            query = self.queries,
            "operation status"
        );

        if operation.is_done() {
            self.state = PollerState::Finished;
            return Ok(Some(PollEvent::Done(PollResult::new(operation))));
        }

        if started.elapsed() >= self.settings.timeout {
            self.state = PollerState::Finished;
            return Err(PollError::OperationTimeout {
                operation: self.handle.name().to_owned(),
                timeout: self.settings.timeout,
            });
        }

        self.state = PollerState::Waiting;
        Ok(Some(PollEvent::Pending {
            status: operation.status,
        }))
    }

    /// Drive the sequence to its terminal result, discarding `Pending` events.
    ///
    /// # Errors
    ///
    /// Propagates timeout and query faults, and returns
    /// `PollError::Exhausted` if the sequence already ended.
    pub async fn drain(&mut self) -> Result<PollResult, PollError> {
        loop {
            match self.next_event().await? {
                Some(PollEvent::Pending { status }) => {
                    tracing::trace!(operation = self.handle.name(), %status, "still pending");
                }
                Some(PollEvent::Done(result)) => return Ok(result),
                None => {
                    return Err(PollError::Exhausted {
                        operation: self.handle.name().to_owned(),
                    });
                }
            }
        }
    }
}
