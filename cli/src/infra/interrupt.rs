//! Ctrl-C handling.
//!
//! Installing a tokio signal listener replaces the default SIGINT behavior
//! for the whole process, so the listener decides: while an operation is
//! being waited on ("armed") the interrupt is handed to the waiter, which
//! cleans up its progress line; otherwise the process exits with 130.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

use crate::application::ports::InterruptSignal;

/// Exit status for a run cancelled by the user.
pub const EXIT_INTERRUPTED: u8 = 130;

#[derive(Default)]
struct Shared {
    armed: AtomicUsize,
    notify: Notify,
}

/// Process-wide Ctrl-C source.
#[derive(Clone, Default)]
pub struct CtrlCSignal {
    shared: Arc<Shared>,
}

impl CtrlCSignal {
    /// Spawn the listener task. Must be called inside a tokio runtime.
    #[must_use]
    pub fn install() -> Self {
        let signal = Self::default();
        let shared = Arc::clone(&signal.shared);
        tokio::spawn(async move {
            loop {
                if tokio::signal::ctrl_c().await.is_err() {
                    tracing::warn!("cannot listen for Ctrl-C");
                    return;
                }
                if shared.armed.load(Ordering::SeqCst) == 0 {
                    tracing::debug!("interrupt outside of a wait, exiting");
                    std::process::exit(i32::from(EXIT_INTERRUPTED));
                }
                tracing::debug!("interrupt delivered to waiter");
                shared.notify.notify_waiters();
            }
        });
        signal
    }

    fn arm(&self) -> ArmGuard<'_> {
        self.shared.armed.fetch_add(1, Ordering::SeqCst);
        ArmGuard {
            shared: &self.shared,
        }
    }
}

struct ArmGuard<'a> {
    shared: &'a Shared,
}

impl Drop for ArmGuard<'_> {
    fn drop(&mut self) {
        self.shared.armed.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InterruptSignal for CtrlCSignal {
    async fn interrupted(&self) {
        let notified = self.shared.notify.notified();
        let _armed = self.arm();
        notified.await;
    }
}
