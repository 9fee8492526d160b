//! Waiting on long-running provider operations.
//!
//! [`Poller`] issues the status queries; [`OperationWaiter`] runs it under a
//! progress session and normalizes the outcome for workflows.

pub mod orchestrator;
pub mod poller;

pub use orchestrator::{OperationWaiter, require_success};
pub use poller::{PollEvent, Poller};
