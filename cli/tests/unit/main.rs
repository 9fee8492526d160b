//! Unit tests for vmlc
//!
//! These tests use in-memory port fakes and run fast without external I/O.

mod instance_workflows;
mod operation_poller;
